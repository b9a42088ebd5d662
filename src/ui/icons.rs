pub struct Icons;

impl Icons {
    pub const CONTAINER: &str = "📦";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const TAG: &str = "🏷️";
    pub const VOLUME: &str = "💾";
    pub const DATABASE: &str = "🗄️";
    pub const EMPTY: &str = "∅";
}
