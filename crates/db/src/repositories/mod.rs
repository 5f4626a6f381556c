//! Data access layer: one stateless repository struct per table.

pub mod invitation_repo;
pub mod request_log_repo;
pub mod request_repo;
pub mod save_offer_repo;
pub mod tenant_repo;
pub mod user_repo;

pub use invitation_repo::InvitationRepo;
pub use request_log_repo::RequestLogRepo;
pub use request_repo::RequestRepo;
pub use save_offer_repo::SaveOfferRepo;
pub use tenant_repo::TenantRepo;
pub use user_repo::UserRepo;
