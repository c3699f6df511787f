//! Fixed endpoint table for the forwarding routes.

/// One of the four sandbox API calls the proxy relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxEndpoint {
    GenerateVideoText,
    GenerateVideoStartImage,
    CheckVideoGenerationStatus,
    UploadUserImage,
}

impl SandboxEndpoint {
    /// Every endpoint, in registration order.
    pub const ALL: [SandboxEndpoint; 4] = [
        SandboxEndpoint::GenerateVideoText,
        SandboxEndpoint::GenerateVideoStartImage,
        SandboxEndpoint::CheckVideoGenerationStatus,
        SandboxEndpoint::UploadUserImage,
    ];

    /// Path the proxy listens on.
    pub fn local_path(self) -> &'static str {
        match self {
            Self::GenerateVideoText => "/api/aisandbox/batchAsyncGenerateVideoText",
            Self::GenerateVideoStartImage => "/api/aisandbox/batchAsyncGenerateVideoStartImage",
            Self::CheckVideoGenerationStatus => "/api/aisandbox/batchCheckAsyncVideoGenerationStatus",
            Self::UploadUserImage => "/api/aisandbox/uploadUserImage",
        }
    }

    /// Path on the upstream host, appended to the configured base URL.
    pub fn upstream_path(self) -> &'static str {
        match self {
            Self::GenerateVideoText => "/v1/video:batchAsyncGenerateVideoText",
            Self::GenerateVideoStartImage => "/v1/video:batchAsyncGenerateVideoStartImage",
            Self::CheckVideoGenerationStatus => "/v1/video:batchCheckAsyncVideoGenerationStatus",
            Self::UploadUserImage => "/v1:uploadUserImage",
        }
    }

    /// Short label for logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Self::GenerateVideoText => "generate_video_text",
            Self::GenerateVideoStartImage => "generate_video_start_image",
            Self::CheckVideoGenerationStatus => "check_video_status",
            Self::UploadUserImage => "upload_user_image",
        }
    }

    /// Full upstream URL for this endpoint.
    pub fn upstream_url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.upstream_path())
    }
}
