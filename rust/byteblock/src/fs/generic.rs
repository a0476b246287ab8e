use std::fs::{File, OpenOptions};

use crate::{fs::AccessMode, options::AccessHints};

pub fn apply_open_options(_options: &mut OpenOptions, _hints: &AccessHints) {}

pub fn advise(_file: &File, _hints: &AccessHints) {}

pub fn access_mode(_file: &File) -> std::io::Result<Option<AccessMode>> {
    Ok(None)
}
