//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query touching
//! user-owned rows takes the caller's user id and filters on it.

pub mod audio_category_repo;
pub mod audio_file_repo;
pub mod audio_mood_repo;
pub mod cliente_repo;
pub mod dashboard_repo;
pub mod diary_entry_repo;
pub mod diary_page_repo;
pub mod group_repo;
pub mod participant_repo;
pub mod pricing_plan_repo;
pub mod session_repo;
pub mod stripe_event_repo;
pub mod user_repo;

pub use audio_category_repo::AudioCategoryRepo;
pub use audio_file_repo::AudioFileRepo;
pub use audio_mood_repo::AudioMoodRepo;
pub use cliente_repo::ClienteRepo;
pub use dashboard_repo::DashboardRepo;
pub use diary_entry_repo::DiaryEntryRepo;
pub use diary_page_repo::DiaryPageRepo;
pub use group_repo::GroupRepo;
pub use participant_repo::ParticipantRepo;
pub use pricing_plan_repo::PricingPlanRepo;
pub use session_repo::SessionRepo;
pub use stripe_event_repo::StripeEventRepo;
pub use user_repo::UserRepo;
