// src/simulation/csv.rs

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::simulation::{Element, SimulationError};
use crate::time::Time;

/// CSV出力の設定とヘッダーの書き込み
pub fn setup_csv_output(path: impl AsRef<Path>) -> Result<BufWriter<File>, SimulationError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv_header(&mut writer)?;
    Ok(writer)
}

/// CSVヘッダーの書き込み
pub fn write_csv_header<W: Write>(writer: &mut W) -> Result<(), std::io::Error> {
    writer.write_all(b"time,element,value\n")
}

/// CSV行の作成
pub fn create_csv_row(time: Time, element: &Element) -> String {
    format!("{},{},{}\n", time, element.id, element.value)
}
