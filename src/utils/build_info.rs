/// Build metadata embedded by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

macro_rules! build_env {
    ($key:literal) => {
        match option_env!($key) {
            Some(value) => value,
            None => "unknown",
        }
    };
}

pub const BUILD: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: build_env!("BUDGET_TREE_BUILD_HASH"),
    git_status: build_env!("BUDGET_TREE_BUILD_STATUS"),
    timestamp: build_env!("BUDGET_TREE_BUILD_TIMESTAMP"),
    target: build_env!("BUDGET_TREE_BUILD_TARGET"),
    profile: build_env!("BUDGET_TREE_BUILD_PROFILE"),
    rustc: build_env!("BUDGET_TREE_BUILD_RUSTC"),
};

impl BuildInfo {
    /// Label/value pairs shown by the `version` command.
    pub fn rows(&self) -> [(&'static str, String); 5] {
        [
            ("Build hash", format!("{} ({})", self.git_hash, self.git_status)),
            ("Built at", self.timestamp.to_string()),
            ("Target", self.target.to_string()),
            ("Profile", self.profile.to_string()),
            ("Rustc", self.rustc.to_string()),
        ]
    }
}
