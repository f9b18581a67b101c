use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.amora.app/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = match modkit::current_request_id() {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    };

    ProblemResponse(problem)
}

fn with_errors(resp: ProblemResponse, errors: Vec<ValidationError>) -> ProblemResponse {
    ProblemResponse(resp.0.with_errors(errors))
}

fn server_error(instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::INTERNAL_SERVER_ERROR,
        "DATING_INTERNAL",
        "Internal error",
        "Server error",
        instance,
    )
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::InvalidDateOfBirth { .. } => with_errors(
            from_parts(
                StatusCode::BAD_REQUEST,
                "DATING_INVALID_DATE_OF_BIRTH",
                "Validation error",
                "Invalid date of birth",
                instance,
            ),
            vec![ValidationError::new("/dateOfBirth", "Invalid date of birth")],
        ),
        DomainError::MatchAlreadyExists { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "DATING_MATCH_ALREADY_EXISTS",
            "Duplicate match",
            "Match already exists",
            instance,
        ),
        DomainError::SelfMatch { .. } => with_errors(
            from_parts(
                StatusCode::BAD_REQUEST,
                "DATING_VALIDATION",
                "Validation error",
                "\"otherUserId\" must differ from \"userId\"",
                instance,
            ),
            vec![ValidationError::new(
                "/otherUserId",
                "must differ from \"userId\"",
            )],
        ),
        DomainError::Validation { field, message } => with_errors(
            from_parts(
                StatusCode::BAD_REQUEST,
                "DATING_VALIDATION",
                "Validation error",
                format!("\"{field}\" {message}"),
                instance,
            ),
            vec![ValidationError::new(format!("/{field}"), message.clone())],
        ),
        DomainError::Unauthenticated { .. } => from_parts(
            StatusCode::UNAUTHORIZED,
            "DATING_UNAUTHENTICATED",
            "Unauthorized",
            "Authentication required",
            instance,
        ),
        DomainError::UserNotFound { .. } => {
            // A valid session for a missing record is a server-side inconsistency.
            tracing::error!(error = %e, "Session refers to a missing user");
            server_error(instance)
        }
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Internal error occurred");
            server_error(instance)
        }
    }
}

/// 400 problem for a body that failed `validator` rules.
/// `detail` joins the individual messages; `errors` points at each field.
pub fn validation_problem(errors: &validator::ValidationErrors, instance: &str) -> ProblemResponse {
    let mut items: Vec<ValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let pointer = format!("/{}", json_field_name(field.as_ref()));
            errs.iter()
                .map(move |err| {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    ValidationError::new(pointer.clone(), detail)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    items.sort_by(|a, b| a.pointer.cmp(&b.pointer).then(a.detail.cmp(&b.detail)));

    let detail = items
        .iter()
        .map(|v| v.detail.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    with_errors(
        from_parts(
            StatusCode::BAD_REQUEST,
            "DATING_VALIDATION",
            "Validation error",
            detail,
            instance,
        ),
        items,
    )
}

/// 400 problem for a body that could not be decoded at all.
fn malformed_body(detail: impl Into<String>, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "DATING_MALFORMED_BODY",
        "Malformed request body",
        detail,
        instance,
    )
}

/// Problem for a body the framework refused to read. Over-limit bodies keep
/// their 413; every other decoding failure is a 400.
pub fn body_rejection(
    status: StatusCode,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return from_parts(
            status,
            "DATING_PAYLOAD_TOO_LARGE",
            "Payload too large",
            detail,
            instance,
        );
    }
    malformed_body(detail, instance)
}

/// 400 problem for a form field the endpoint does not accept.
pub fn unknown_field(field: &str, instance: &str) -> ProblemResponse {
    let detail = format!("\"{field}\" is not allowed");
    with_errors(
        from_parts(
            StatusCode::BAD_REQUEST,
            "DATING_VALIDATION",
            "Validation error",
            detail.clone(),
            instance,
        ),
        vec![ValidationError::new(format!("/{field}"), detail)],
    )
}

/// `date_of_birth` -> `dateOfBirth`, matching the wire names.
fn json_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
