//! Data types of the video API client.

mod types;

pub use types::{
    ArchiveLayout, ArchiveMode, ArchiveOptions, ArchiveOutputMode, ArchiveSearchFilter,
    BroadcastConfig, BroadcastOutputs, BroadcastSearchFilter, BroadcastUpdateConfig,
    CaptionOptions, ClientTokenClaims, ClientTokenOptions, ExperienceComposerListFilter,
    ExperienceComposerOptions, LayoutType, MediaMode, MultiResponse, RTMPStream, SIPAuth,
    SIPCallOptions, Session, StreamClassList, VideoResponse, WebSocketConfig,
};
