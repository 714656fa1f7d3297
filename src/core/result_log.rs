use crate::domain::model::{ImportOutcome, ImportSummary};
use crate::utils::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 一次匯入的成功／失敗紀錄
///
/// 失敗紀錄為 CSV：原始欄位加上失敗原因，可直接修正後重新匯入。
/// 成功紀錄每筆一行文字。兩個檔案都只會附加寫入。
pub struct ResultLog {
    failure_log: csv::Writer<File>,
    success_log: BufWriter<File>,
    failure_log_name: PathBuf,
    success_log_name: PathBuf,
    successes: usize,
    failures: usize,
}

impl ResultLog {
    /// 在輸出目錄建立兩個唯一檔名的紀錄檔（目錄不存在時自動建立）
    pub fn create(output_dir: &Path, prefix: &str) -> Result<Self> {
        fs::create_dir_all(output_dir)?;

        let (failure_file, failure_log_name) =
            create_unique(output_dir, &format!("{}_failures", prefix), ".csv")?;
        let (success_file, success_log_name) =
            create_unique(output_dir, &format!("{}_successes", prefix), ".log")?;

        tracing::debug!(
            "Result logs: failures={}, successes={}",
            failure_log_name.display(),
            success_log_name.display()
        );

        Ok(Self {
            failure_log: csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(failure_file),
            success_log: BufWriter::new(success_file),
            failure_log_name,
            success_log_name,
            successes: 0,
            failures: 0,
        })
    }

    pub fn record(&mut self, outcome: &ImportOutcome) -> Result<()> {
        match outcome {
            ImportOutcome::Success { account_id, .. } => {
                writeln!(self.success_log, "Import succeeded for account ID {}", account_id)?;
                self.successes += 1;
            }
            ImportOutcome::Failure {
                row_number,
                row,
                reason,
            } => {
                let reason = reason.to_string();
                tracing::warn!("⚠️ Row {} failed: {}", row_number, reason);

                let mut line: Vec<&str> = row.fields().iter().map(String::as_str).collect();
                line.push(&reason);
                self.failure_log.write_record(&line)?;
                self.failures += 1;
            }
        }
        Ok(())
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// 寫出緩衝並關閉檔案
    pub fn finish(mut self) -> Result<ImportSummary> {
        self.failure_log.flush()?;
        self.success_log.flush()?;

        Ok(ImportSummary {
            successes: self.successes,
            failures: self.failures,
            failure_log_name: self.failure_log_name,
            success_log_name: self.success_log_name,
        })
    }
}

fn create_unique(dir: &Path, prefix: &str, suffix: &str) -> Result<(File, PathBuf)> {
    let named = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)?;
    let (file, path) = named.keep().map_err(|e| e.error)?;
    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FailureReason, ImportRow};
    use tempfile::TempDir;

    #[test]
    fn test_create_makes_output_dir_and_prefixed_files() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("log_output");

        let log = ResultLog::create(&output_dir, "account_service_import").unwrap();
        let summary = log.finish().unwrap();

        assert!(output_dir.is_dir());
        let failure_name = summary.failure_log_name.file_name().unwrap().to_string_lossy().to_string();
        let success_name = summary.success_log_name.file_name().unwrap().to_string_lossy().to_string();
        assert!(failure_name.starts_with("account_service_import_failures"));
        assert!(success_name.starts_with("account_service_import_successes"));
        assert!(summary.failure_log_name.exists());
        assert!(summary.success_log_name.exists());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_two_runs_never_share_files() {
        let temp_dir = TempDir::new().unwrap();

        let first = ResultLog::create(temp_dir.path(), "untokenized_card_import")
            .unwrap()
            .finish()
            .unwrap();
        let second = ResultLog::create(temp_dir.path(), "untokenized_card_import")
            .unwrap()
            .finish()
            .unwrap();

        assert_ne!(first.failure_log_name, second.failure_log_name);
        assert_ne!(first.success_log_name, second.success_log_name);
    }

    #[test]
    fn test_records_outcomes() {
        let temp_dir = TempDir::new().unwrap();
        let mut log = ResultLog::create(temp_dir.path(), "account_service_import").unwrap();

        log.record(&ImportOutcome::Success {
            row_number: 1,
            account_id: "100".to_string(),
        })
        .unwrap();
        log.record(&ImportOutcome::Failure {
            row_number: 2,
            row: ImportRow::new(vec!["101".to_string(), "7".to_string(), "Promo, spring".to_string()]),
            reason: FailureReason::RemoteRejection {
                status: 422,
                message: "invalid".to_string(),
            },
        })
        .unwrap();

        assert_eq!(log.successes(), 1);
        assert_eq!(log.failures(), 1);
        let summary = log.finish().unwrap();

        let successes = std::fs::read_to_string(&summary.success_log_name).unwrap();
        assert_eq!(successes, "Import succeeded for account ID 100\n");

        let failures = std::fs::read_to_string(&summary.failure_log_name).unwrap();
        assert_eq!(failures, "101,7,\"Promo, spring\",invalid\n");
    }
}
