
use rustc_hash::FxHashSet as HashSet;
use simple_error::bail;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Helper function that loads a file into some type, helpful generic
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)?
            )
        )
    } else {
        Box::new(File::open(filename)?)
    };
    let result: T = serde_json::from_reader(BufReader::new(fp))?;
    Ok(result)
}

/// This will save a generic serializable struct to JSON.
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(out_filename)?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(File::create(out_filename)?)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

/// Reads the marker filter list: one marker ID per line, order preserved.
/// Blank lines and surrounding whitespace are ignored.
/// # Arguments
/// * `filename` - the marker list file
/// # Errors
/// * if the file cannot be opened or read
/// * if a marker is listed twice
pub fn load_marker_list(filename: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let file = File::open(filename)?;
    read_marker_list(BufReader::new(file))
}

/// Same as `load_marker_list`, but from any buffered reader
pub fn read_marker_list<R: BufRead>(reader: R) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut markers: Vec<String> = vec![];
    let mut observed: HashSet<String> = Default::default();
    for line in reader.lines() {
        let line = line?;
        let marker = line.trim();
        if marker.is_empty() {
            continue;
        }
        if !observed.insert(marker.to_string()) {
            bail!("Marker {marker} is listed more than once");
        }
        markers.push(marker.to_string());
    }
    Ok(markers)
}

/// Writes a single-line text artifact, the line is always newline terminated
/// # Arguments
/// * `line` - the content
/// * `filename` - the output path
pub fn save_line(line: &str, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = BufWriter::new(File::create(filename)?);
    writeln!(writer, "{line}")?;
    writer.flush()?;
    Ok(())
}
