use std::sync::Arc;

use crate::catalog::CatalogRepository;
use crate::cms::CmsClient;
use crate::partner::PartnerClient;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogRepository>,
    pub cms: Arc<dyn CmsClient>,
    pub partner: Arc<dyn PartnerClient>,
}
