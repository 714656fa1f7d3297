use crate::core::payload::coerce_int;
use crate::core::reference::ReferenceDataCache;
use crate::core::result_log::ResultLog;
use crate::core::validator::RowValidator;
use crate::core::variant::{AccountServiceImport, CreditCardImport, ImportVariant};
use crate::domain::model::{
    DispatchStrategy, FailureReason, ImportOutcome, ImportRow, ImportSummary, ReferenceIndex,
};
use crate::domain::ports::{BillingApi, ConfigProvider};
use crate::utils::error::{ImportError, Result};
use futures::stream::{self, Stream, StreamExt};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 引擎執行時需要的設定
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub remote_name: String,
}

impl EngineSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            output_dir: config.output_dir().to_path_buf(),
            concurrency: config.concurrent_requests(),
            remote_name: config.remote_name().to_string(),
        }
    }
}

/// 批次匯入引擎：讀檔、整檔驗證、逐列送出並記錄結果
pub struct BatchImportEngine<A: BillingApi> {
    api: A,
    settings: EngineSettings,
}

impl<A: BillingApi> BatchImportEngine<A> {
    pub fn new(api: A, settings: EngineSettings) -> Self {
        Self { api, settings }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn import_account_services(&self, path: &Path) -> Result<ImportSummary> {
        let variant = AccountServiceImport;
        let strategy = variant.default_strategy(self.settings.concurrency);
        self.import(&variant, path, strategy).await
    }

    pub async fn import_credit_cards(&self, path: &Path) -> Result<ImportSummary> {
        let variant = CreditCardImport;
        let strategy = variant.default_strategy(self.settings.concurrency);
        self.import(&variant, path, strategy).await
    }

    /// 執行一次完整匯入
    ///
    /// 檔案無法開啟或驗證失敗時直接回傳錯誤，此時不會送出任何匯入請求，
    /// 也不會建立紀錄檔。單列的遠端拒絕或傳輸失敗只會記入失敗紀錄。
    ///
    /// 必填欄位會先對整個檔案檢查一遍，所以檔案中任何一列缺必填欄位時，
    /// 回報的是那一列，即使更前面的列有不存在的服務 ID。
    pub async fn import<V: ImportVariant>(
        &self,
        variant: &V,
        path: &Path,
        strategy: DispatchStrategy,
    ) -> Result<ImportSummary> {
        let start_time = Instant::now();
        tracing::info!(
            "🚀 Starting {} import from {} ({})",
            variant.label(),
            path.display(),
            strategy
        );

        let rows = read_rows(path)?;
        tracing::info!("📥 Read {} rows", rows.len());

        // 必填欄位先檢查，結構錯誤時連參考資料都不用抓
        let validator = RowValidator::new(variant);
        validator.check_required(&rows)?;

        let reference = if variant.needs_reference_data() {
            ReferenceDataCache::new(&self.api).load().await?
        } else {
            ReferenceIndex::new()
        };
        validator.validate(&rows, &reference)?;

        let mut log = ResultLog::create(&self.settings.output_dir, variant.log_prefix())?;

        match strategy {
            DispatchStrategy::Pooled { concurrency } => {
                self.dispatch_pooled(variant, &rows, concurrency, &mut log).await?
            }
            DispatchStrategy::Sequential => self.dispatch_sequential(variant, &rows, &mut log).await?,
        }

        let summary = log.finish()?;
        tracing::info!(
            "✅ {} import finished: {} succeeded, {} failed in {:?}",
            variant.label(),
            summary.successes,
            summary.failures,
            start_time.elapsed()
        );
        Ok(summary)
    }

    /// 固定寬度的請求池；完成順序不保證與輸入順序相同，
    /// 結果統一由這個迴圈寫入紀錄，不需要額外的鎖
    async fn dispatch_pooled<V: ImportVariant>(
        &self,
        variant: &V,
        rows: &[ImportRow],
        concurrency: usize,
        log: &mut ResultLog,
    ) -> Result<()> {
        let no_response = format!("No response returned from {}.", self.settings.remote_name);

        let mut completions = stream::iter(rows.iter().enumerate())
            .map(|(index, row)| {
                let no_response = no_response.as_str();
                async move {
                    self.submit_row(variant, index + 1, row, |_| no_response.to_string())
                        .await
                }
            })
            .buffer_unordered(concurrency.max(1));

        drain_outcomes(&mut completions, |outcome| log.record(outcome)).await
    }

    /// 逐列送出；單列失敗不影響後續列
    async fn dispatch_sequential<V: ImportVariant>(
        &self,
        variant: &V,
        rows: &[ImportRow],
        log: &mut ResultLog,
    ) -> Result<()> {
        for (index, row) in rows.iter().enumerate() {
            let outcome = self
                .submit_row(variant, index + 1, row, |error| error.to_string())
                .await;
            log.record(&outcome)?;
        }
        Ok(())
    }

    async fn submit_row<V, F>(
        &self,
        variant: &V,
        row_number: usize,
        row: &ImportRow,
        transport_message: F,
    ) -> ImportOutcome
    where
        V: ImportVariant,
        F: FnOnce(&ImportError) -> String,
    {
        let account_id = row.trimmed(0).to_string();
        let endpoint = variant.endpoint(coerce_int(&account_id));
        let payload = variant.build_payload(row);

        tracing::debug!("Row {}: POST {}", row_number, endpoint);

        match self.api.post_json(&endpoint, &payload).await {
            Ok(response) if response.is_accepted() => ImportOutcome::Success {
                row_number,
                account_id,
            },
            Ok(response) => ImportOutcome::Failure {
                row_number,
                row: row.clone(),
                reason: FailureReason::RemoteRejection {
                    status: response.status,
                    message: response.error_message(),
                },
            },
            Err(error) => {
                tracing::debug!("Row {}: no response: {}", row_number, error);
                ImportOutcome::Failure {
                    row_number,
                    row: row.clone(),
                    reason: FailureReason::Transport {
                        message: transport_message(&error),
                    },
                }
            }
        }
    }
}

/// 收完每一個已送出請求的結果；紀錄寫入失敗時不會取消其他進行中的請求，
/// 全部完成後回傳第一個錯誤
async fn drain_outcomes<S, F>(completions: &mut S, mut record: F) -> Result<()>
where
    S: Stream<Item = ImportOutcome> + Unpin,
    F: FnMut(&ImportOutcome) -> Result<()>,
{
    let mut first_error = None;
    while let Some(outcome) = completions.next().await {
        if first_error.is_some() {
            tracing::error!("Result not logged: {:?}", outcome);
            continue;
        }
        if let Err(e) = record(&outcome) {
            tracing::error!("❌ Failed to write result log: {}", e);
            first_error = Some(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// 讀入整個檔案（無標題列，各列欄位數可不同）
///
/// 空白行也算一列（欄位為空），之後各列的列號才會與檔案一致。
/// 引號內的換行會併入同一列。
pub fn read_rows(path: &Path) -> Result<Vec<ImportRow>> {
    let file = File::open(path).map_err(|source| ImportError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;

    let mut rows = Vec::new();
    let mut pending = String::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if pending.is_empty() && line.is_empty() {
            rows.push(ImportRow::new(Vec::new()));
            continue;
        }

        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(&line);

        // 引號數為奇數表示欄位尚未結束
        if pending.matches('"').count() % 2 == 0 {
            rows.push(parse_record(&pending)?);
            pending.clear();
        }
    }

    if !pending.is_empty() {
        rows.push(parse_record(&pending)?);
    }
    Ok(rows)
}

fn parse_record(text: &str) -> Result<ImportRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(ImportRow::from(&record))
}
