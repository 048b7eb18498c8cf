//! Power telemetry ingestion.
//!
//! Each benchmark run has one hardware-monitor export named
//! `<pattern>_<language>.csv`. The configured power column is extracted from
//! every file and reduced to its mean. Problems with individual files are
//! logged and recorded as skips so that one bad export never stops the batch;
//! only a missing telemetry directory is fatal.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use pattern_energy_core::{PowerAverage, SkipReason, SkippedFile};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The telemetry directory does not exist or is not a directory.
    #[error("Telemetry directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The telemetry directory could not be listed.
    #[error("Failed to list telemetry directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Power averages produced from a telemetry directory, plus the files skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    pub averages: Vec<PowerAverage>,
    pub skipped: Vec<SkippedFile>,
}

/// Decode bytes as ISO-8859-1. Every byte maps to the code point of the same
/// value, so decoding never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Normalize a power cell such as `"45,3 W"` and parse it.
///
/// Returns `None` for empty, unparseable or non-finite values.
pub fn parse_power_value(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".").replace(" W", "");
    normalized
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// The stem of a file name with a case-insensitive `.csv` extension.
pub fn csv_stem(file_name: &str) -> Option<&str> {
    let path = Path::new(file_name);
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        path.file_stem().and_then(|stem| stem.to_str())
    } else {
        None
    }
}

/// Split a stem into `(pattern, language)`; exactly one `_`, no empty halves.
pub fn split_key(stem: &str) -> Option<(&str, &str)> {
    let mut parts = stem.split('_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(pattern), Some(language), None) if !pattern.is_empty() && !language.is_empty() => {
            Some((pattern, language))
        }
        _ => None,
    }
}

/// Reads telemetry exports and reduces them to [`PowerAverage`]s.
#[derive(Debug, Clone)]
pub struct PowerLogIngestor {
    /// Header of the power column, matched after trimming each header.
    power_column: String,
}

impl PowerLogIngestor {
    pub fn new(power_column: impl Into<String>) -> Self {
        Self {
            power_column: power_column.into(),
        }
    }

    /// Extract the valid power samples from decoded CSV text.
    pub fn samples(&self, text: &str) -> Result<Vec<f64>, SkipReason> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        let column = headers
            .iter()
            .position(|h| h.trim() == self.power_column)
            .ok_or_else(|| SkipReason::MissingColumn {
                column: self.power_column.clone(),
            })?;

        let mut samples = Vec::new();
        let mut missing = 0usize;
        for row in reader.records() {
            let value = row
                .ok()
                .and_then(|row| row.get(column).and_then(parse_power_value));
            match value {
                Some(v) => samples.push(v),
                None => missing += 1,
            }
        }

        if missing > 0 {
            debug!(
                missing,
                valid = samples.len(),
                "Dropped non-numeric power readings"
            );
        }
        Ok(samples)
    }

    /// Read one telemetry file and reduce it to a power average.
    pub fn read_file(
        &self,
        path: &Path,
        pattern: &str,
        language: &str,
    ) -> Result<PowerAverage, SkipReason> {
        let bytes = fs::read(path).map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        let samples = self.samples(&decode_latin1(&bytes))?;
        PowerAverage::from_samples(pattern, language, &samples).ok_or(SkipReason::NoValidSamples)
    }

    fn skip(summary: &mut IngestSummary, file_name: String, reason: SkipReason) {
        warn!(file = %file_name, reason = %reason, "Skipped telemetry file");
        summary.skipped.push(SkippedFile { file_name, reason });
    }

    /// Ingest every `.csv` file in `dir`, in file name order.
    ///
    /// # Errors
    ///
    /// Only a missing or unlistable directory is an error; per-file problems
    /// end up in [`IngestSummary::skipped`].
    pub fn ingest_dir(&self, dir: &Path) -> Result<IngestSummary, IngestError> {
        if !dir.is_dir() {
            return Err(IngestError::DirectoryNotFound(dir.to_path_buf()));
        }

        let read_dir_error = |source| IngestError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            if entry.path().is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();

        let mut summary = IngestSummary::default();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for file_name in files {
            let Some(stem) = csv_stem(&file_name) else {
                debug!(file = %file_name, "Ignoring non-CSV file");
                continue;
            };
            let Some((pattern, language)) = split_key(stem) else {
                Self::skip(&mut summary, file_name, SkipReason::MalformedFilename);
                continue;
            };
            let key = (pattern.to_string(), language.to_string());
            if seen.contains(&key) {
                let reason = SkipReason::DuplicateKey {
                    pattern: key.0,
                    language: key.1,
                };
                Self::skip(&mut summary, file_name, reason);
                continue;
            }

            match self.read_file(&dir.join(&file_name), pattern, language) {
                Ok(average) => {
                    info!(
                        file = %file_name,
                        samples = average.sample_count,
                        "Processed telemetry file, average power {:.2} W",
                        average.average_power_w
                    );
                    seen.insert(key);
                    summary.averages.push(average);
                }
                Err(reason) => Self::skip(&mut summary, file_name, reason),
            }
        }

        if summary.averages.is_empty() {
            warn!(dir = %dir.display(), "No power data extracted");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMN: &str = "CPU Package Power [W]";

    fn ingestor() -> PowerLogIngestor {
        PowerLogIngestor::new(COLUMN)
    }

    fn write(dir: &Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_parse_power_value() {
        assert_eq!(parse_power_value("45,3 W"), Some(45.3));
        assert_eq!(parse_power_value(" 12.5 "), Some(12.5));
        assert_eq!(parse_power_value("7"), Some(7.0));
        assert_eq!(parse_power_value("-3,5 W"), Some(-3.5));
        assert_eq!(parse_power_value(""), None);
        assert_eq!(parse_power_value("n/a"), None);
        assert_eq!(parse_power_value("NaN"), None);
        assert_eq!(parse_power_value("inf"), None);
    }

    #[test]
    fn test_csv_stem() {
        assert_eq!(csv_stem("decorator_java.csv"), Some("decorator_java"));
        assert_eq!(csv_stem("decorator_java.CSV"), Some("decorator_java"));
        assert_eq!(csv_stem("decorator_java.Csv"), Some("decorator_java"));
        assert_eq!(csv_stem("decorator_java.txt"), None);
        assert_eq!(csv_stem("README"), None);
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("decorator_java"), Some(("decorator", "java")));
        assert_eq!(split_key("decoratorjava"), None);
        assert_eq!(split_key("a_b_c"), None);
        assert_eq!(split_key("decorator_"), None);
        assert_eq!(split_key("_java"), None);
    }

    #[test]
    fn test_decode_latin1() {
        // 0xB0 is the degree sign in ISO-8859-1 and invalid as UTF-8.
        assert_eq!(decode_latin1(b"Temp [\xB0C]"), "Temp [\u{B0}C]");
    }

    #[test]
    fn test_samples_skip_invalid_rows() {
        let text = "Date,Time, CPU Package Power [W] ,Other\n\
                    1.1.2024,10:00:00,\"45,3 W\",1\n\
                    1.1.2024,10:00:01,garbage,1\n\
                    1.1.2024,10:00:02,,1\n\
                    1.1.2024,10:00:03,50.7,1\n\
                    1.1.2024,10:00:04\n";

        let samples = ingestor().samples(text).unwrap();
        assert_eq!(samples, vec![45.3, 50.7]);
    }

    #[test]
    fn test_samples_missing_column() {
        let result = ingestor().samples("Date,CPU Power\n1,2\n");
        assert_eq!(
            result,
            Err(SkipReason::MissingColumn {
                column: COLUMN.to_string()
            })
        );
    }

    #[test]
    fn test_read_file_mean_of_valid_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observer_python.csv");
        fs::write(
            &path,
            b"CPU Package Power [W],Temp [\xB0C]\n10,40\n20,41\nx,42\n30,43\n",
        )
        .unwrap();

        let average = ingestor().read_file(&path, "observer", "python").unwrap();
        assert_eq!(average.pattern, "observer");
        assert_eq!(average.language, "python");
        assert_eq!(average.sample_count, 3);
        assert!((average.average_power_w - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_read_file_all_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observer_python.csv");
        fs::write(&path, "CPU Package Power [W]\nfoo\nbar\n").unwrap();

        let result = ingestor().read_file(&path, "observer", "python");
        assert_eq!(result, Err(SkipReason::NoValidSamples));
    }

    #[test]
    fn test_ingest_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "decorator_java.CSV", b"CPU Package Power [W]\n10\n20\n");
        write(dir.path(), "decorator_python.csv", b"CPU Package Power [W]\n\"30,5 W\"\n");
        write(dir.path(), "decoratorjava.csv", b"CPU Package Power [W]\n1\n");
        write(dir.path(), "a_b_c.csv", b"CPU Package Power [W]\n1\n");
        write(dir.path(), "observer_java.csv", b"GPU Power [W]\n1\n");
        write(dir.path(), "strategy_java.csv", b"CPU Package Power [W]\nnope\n");
        write(dir.path(), "notes.txt", b"ignored");

        let summary = ingestor().ingest_dir(dir.path()).unwrap();

        assert_eq!(summary.averages.len(), 2);
        assert_eq!(summary.averages[0].key(), ("decorator", "java"));
        assert!((summary.averages[0].average_power_w - 15.0).abs() < 1e-12);
        assert_eq!(summary.averages[1].key(), ("decorator", "python"));
        assert!((summary.averages[1].average_power_w - 30.5).abs() < 1e-12);

        let skipped: Vec<(&str, &SkipReason)> = summary
            .skipped
            .iter()
            .map(|s| (s.file_name.as_str(), &s.reason))
            .collect();
        assert_eq!(skipped.len(), 4);
        assert!(skipped.contains(&("a_b_c.csv", &SkipReason::MalformedFilename)));
        assert!(skipped.contains(&("decoratorjava.csv", &SkipReason::MalformedFilename)));
        assert!(skipped.contains(&("strategy_java.csv", &SkipReason::NoValidSamples)));
        assert!(matches!(
            summary.skipped.iter().find(|s| s.file_name == "observer_java.csv"),
            Some(SkippedFile {
                reason: SkipReason::MissingColumn { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_ingest_dir_duplicate_key() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "decorator_java.CSV", b"CPU Package Power [W]\n10\n");
        write(dir.path(), "decorator_java.csv", b"CPU Package Power [W]\n99\n");

        let summary = ingestor().ingest_dir(dir.path()).unwrap();

        assert_eq!(summary.averages.len(), 1);
        // "decorator_java.CSV" sorts before "decorator_java.csv".
        assert_eq!(summary.averages[0].average_power_w, 10.0);
        assert_eq!(
            summary.skipped[0].reason,
            SkipReason::DuplicateKey {
                pattern: "decorator".to_string(),
                language: "java".to_string()
            }
        );
    }

    #[test]
    fn test_ingest_missing_directory() {
        let result = ingestor().ingest_dir(Path::new("/nonexistent/telemetry"));
        assert!(matches!(result, Err(IngestError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_ingest_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let summary = ingestor().ingest_dir(dir.path()).unwrap();
        assert!(summary.averages.is_empty());
        assert!(summary.skipped.is_empty());
    }
}
