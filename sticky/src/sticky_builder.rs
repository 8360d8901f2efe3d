use crate::errors::{StickyError, StickyResult};
use crate::sticky::Sticky;
use crate::sticky_config::StickyConfig;
use crate::store::StoreClient;

/// Configures connections before opening a [Sticky] instance.
///
/// Registration errors are kept and reported by [open](StickyBuilder::open),
/// so calls can be chained freely; the first error wins.
///
/// ```rust,ignore
/// let sticky = Sticky::builder()
///     .connect("library", InMemoryClient::connect())
///     .register_connection(InMemoryClient::connect(), "archive")
///     .register_database("old_books", "archive")
///     .open()?;
/// ```
#[derive(Default)]
pub struct StickyBuilder {
    error: Option<StickyError>,
    sticky_config: StickyConfig,
}

impl StickyBuilder {
    pub fn new() -> Self {
        StickyBuilder {
            error: None,
            sticky_config: StickyConfig::new(),
        }
    }

    /// Registers `client` under the default alias and selects `database_name` on it.
    pub fn connect(mut self, database_name: &str, client: StoreClient) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.sticky_config.connect(database_name, client) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn register_connection(mut self, client: StoreClient, alias: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.sticky_config.register_connection(client, alias) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn register_database(mut self, database_name: &str, alias: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.sticky_config.register_database(database_name, alias) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn open(self) -> StickyResult<Sticky> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Sticky::new(self.sticky_config))
    }
}
