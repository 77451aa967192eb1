use url::Url;

/// Validation results with specific error messages
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(msg.into()) }
    }
}

/// Validate HTTP/HTTPS URL endpoint
pub fn validate_http_endpoint(target: &str) -> ValidationResult {
    if target.trim().is_empty() {
        return ValidationResult::err("URL cannot be empty");
    }

    match Url::parse(target) {
        Ok(url) => {
            let scheme = url.scheme();
            if scheme != "http" && scheme != "https" {
                return ValidationResult::err(format!(
                    "Invalid scheme '{scheme}'. Must be http or https"
                ));
            }

            if url.host_str().is_none() {
                return ValidationResult::err("URL must have a valid host");
            }

            ValidationResult::ok()
        }
        Err(e) => {
            // If it fails to parse, check if it's missing a scheme
            if !target.contains("://") {
                ValidationResult::err("URL must include scheme (http:// or https://)")
            } else {
                ValidationResult::err(format!("Invalid URL: {e}"))
            }
        }
    }
}

/// Validate a monitored endpoint's display name
pub fn validate_endpoint_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return ValidationResult::err("Name cannot be empty");
    }

    if trimmed.len() > 100 {
        return ValidationResult::err("Name too long (max 100 characters)");
    }

    ValidationResult::ok()
}
