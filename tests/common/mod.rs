//! Shared test constants and helpers for integration tests.
#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// Three entries in file order with indices 1, 3, 2.
///
/// `smith2019` carries every auxiliary field; `roe2018` is a thesis with a
/// school; `lee2021` has a title with a protected brace group.
pub const SAMPLE_BIB: &str = r#"
@inproceedings{smith2019,
    author = {Smith, Alice and Jones, Bob},
    title = {Fast Sorting on Small Machines},
    booktitle = {Proceedings of the Workshop on Tests},
    year = {2019},
    index = {1},
    pdf = {https://example.org/smith2019.pdf},
    slides = {https://example.org/smith2019-slides.pdf},
    poster = {https://example.org/smith2019-poster.pdf},
    code = {https://github.com/example/sorting},
    session = {Systems I}
}

@phdthesis{roe2018,
    author = {Roe, Richard},
    title = {On Theses},
    school = {Example University},
    year = {2018},
    index = {3}
}

@misc{lee2021,
    author = {Lee, Ann},
    title = {{Company} uses braces},
    year = {2021},
    index = {2}
}
"#;

/// Writes `content` to a temporary file with the given extension.
pub fn create_temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Builds a `@misc` entry with the given key and raw index value.
pub fn misc_entry(key: &str, index: &str) -> String {
    format!(
        "@misc{{{key},\n    author = {{Doe, Jane}},\n    title = {{Title of {key}}},\n    year = {{2020}},\n    index = {{{index}}}\n}}\n",
        key = key,
        index = index
    )
}

/// Settings TOML pointing at `src`.
pub fn settings_toml(src: &std::path::Path) -> String {
    format!("PUBLICATIONS_SRC = {:?}\n", src.to_string_lossy())
}
