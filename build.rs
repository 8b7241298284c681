fn main() {
    // The ESP-IDF link/env plumbing is only meaningful when building the
    // device image; host test builds skip it.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
