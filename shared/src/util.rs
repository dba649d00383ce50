/// Current UTC timestamp in seconds
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
