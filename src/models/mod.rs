//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod category;
pub mod event;
pub mod request;
pub mod comment;
pub mod compilation;
pub mod hit;

// Re-export commonly used models
pub use user::{User, NewUserRequest, UserDto, UserShortDto};
pub use category::{Category, CategoryDto, NewCategoryRequest, UpdateCategoryRequest};
pub use event::{
    Event, EventState, EventChanges, EventFullDto, EventShortDto, EventSort, Location, NewEventRequest,
    UpdateEventUserRequest, UpdateEventAdminRequest, UserStateAction, AdminStateAction, AdminEventFilter,
    PublicEventFilter,
};
pub use request::{
    ParticipationRequest, ParticipationRequestDto, RequestStatus, RequestDecision, EventRequestStatusUpdateRequest,
    EventRequestStatusUpdateResult, StatusUpdatePlan,
};
pub use comment::{Comment, CommentDto, CommentStatus, ModerationDecision, NewCommentRequest, UpdateCommentRequest, ModerateCommentRequest};
pub use compilation::{Compilation, CompilationDto, NewCompilationRequest, UpdateCompilationRequest};
pub use hit::{Hit, EndpointHit, ViewStats, StatsQuery};
