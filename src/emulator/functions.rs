//! Addressing rules of the functions emulator.

/// The functions emulator, as seen from other emulators.
pub struct FunctionsEmulator;

impl FunctionsEmulator {
    /// URL at which the emulator serves an HTTPS function.
    ///
    /// The emulator routes on `/{project}/{region}/{function}`.
    pub fn http_function_url(
        host: &str,
        port: u16,
        project_id: &str,
        function: &str,
        region: &str,
    ) -> String {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };
        format!(
            "http://{}:{}/{}/{}/{}",
            host, port, project_id, region, function
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_function_url() {
        assert_eq!(
            FunctionsEmulator::http_function_url("localhost", 5001, "demo", "api", "us-central1"),
            "http://localhost:5001/demo/us-central1/api"
        );
    }

    #[test]
    fn test_http_function_url_ipv6() {
        assert_eq!(
            FunctionsEmulator::http_function_url("::1", 5001, "demo", "api", "europe-west1"),
            "http://[::1]:5001/demo/europe-west1/api"
        );
        assert_eq!(
            FunctionsEmulator::http_function_url("[::1]", 5001, "demo", "api", "europe-west1"),
            "http://[::1]:5001/demo/europe-west1/api"
        );
    }
}
