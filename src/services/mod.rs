//! Narrow interfaces to the collaborators the session depends on.
pub mod catalog;
pub mod channel;
pub mod identity;
pub mod profile;

pub use catalog::{categories, load_products, Catalog, CatalogError, CatalogFilter, PgCatalog, StaticCatalog};
pub use channel::{compose_order_summary, whatsapp_link, ChannelError, ExternalChannel};
pub use identity::{resolve_display_name, CustomerInfo, Identity, IdentityError, IdentityMetadata, IdentitySource, StaticIdentity};
pub use profile::{fetch_profile, update_profile, PgProfileStore, ProfileError, ProfileStore, ProfileUpdate, UserProfile};
