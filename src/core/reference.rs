use crate::domain::model::{ReferenceIndex, ServicePage};
use crate::domain::ports::BillingApi;
use crate::utils::error::{ImportError, Result};

/// 分頁讀取遠端服務清單，建立可匯入服務的索引
pub struct ReferenceDataCache<'a, A: BillingApi> {
    api: &'a A,
}

impl<'a, A: BillingApi> ReferenceDataCache<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// 讀完所有分頁才回傳索引，不會交出不完整的結果
    pub async fn load(&self) -> Result<ReferenceIndex> {
        let mut index = ReferenceIndex::new();
        let mut page = 1;

        let mut listing = self.fetch(page).await?;
        let mut total_pages = listing.paginator.total_pages;
        let mut current_page = listing.paginator.current_page;
        index.merge_page(listing);

        // 頁碼一定遞增，並以回報的總頁數為上限
        while current_page != total_pages && page < total_pages {
            page += 1;
            listing = self.fetch(page).await?;
            total_pages = listing.paginator.total_pages;
            current_page = listing.paginator.current_page;
            index.merge_page(listing);
        }

        tracing::info!(
            "📋 Loaded {} eligible services from {} page(s)",
            index.len(),
            page
        );
        Ok(index)
    }

    async fn fetch(&self, page: u32) -> Result<ServicePage> {
        tracing::debug!("Fetching service catalog page {}", page);
        self.api.list_services(page).await.map_err(|e| match e {
            err @ ImportError::RemoteUnavailable { .. } => err,
            other => ImportError::RemoteUnavailable {
                message: format!("failed to load service catalog page {}: {}", page, other),
            },
        })
    }
}
