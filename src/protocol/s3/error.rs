//! Mapping of AWS SDK failures onto backend errors

use crate::backend::BackendError;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;

const BACKEND: &str = "s3";

/// Convert an SDK error into a [`BackendError`]
///
/// Transport failures (timeouts, dispatch failures, unreadable responses)
/// become `Unavailable`; anything S3 answered becomes `Rejected` carrying the
/// service error code and HTTP status.
pub(crate) fn map_sdk_error<E>(error: SdkError<E, HttpResponse>) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let transport = match &error {
        SdkError::TimeoutError(_) => Some("request timed out"),
        SdkError::DispatchFailure(_) => Some("could not reach endpoint"),
        SdkError::ResponseError(_) => Some("unreadable response"),
        SdkError::ServiceError(_) => None,
        SdkError::ConstructionFailure(_) => {
            return BackendError::InvalidConfig {
                backend: BACKEND.to_string(),
                message: format!("could not build request: {}", DisplayErrorContext(&error)),
            };
        }
        _ => Some("request failed"),
    };

    if let Some(message) = transport {
        return BackendError::unavailable(BACKEND, message, error);
    }

    let status = error.raw_response().map(|r| r.status().as_u16());
    let code = error.code().unwrap_or("Unknown").to_string();
    let message = error
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&error).to_string());

    BackendError::Rejected {
        backend: BACKEND.to_string(),
        code,
        message,
        status,
    }
}

/// HeadObject answered 404: the key is absent, not an error
pub(crate) fn is_missing_object(error: &SdkError<HeadObjectError, HttpResponse>) -> bool {
    error
        .as_service_error()
        .is_some_and(HeadObjectError::is_not_found)
}

/// GetObject failure, with `NoSuchKey` reported as `NotFound`
pub(crate) fn map_get_error(
    key: &str,
    error: SdkError<GetObjectError, HttpResponse>,
) -> BackendError {
    if error
        .as_service_error()
        .is_some_and(GetObjectError::is_no_such_key)
    {
        BackendError::not_found(BACKEND, key)
    } else {
        map_sdk_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::primitives::SdkBody;
    use aws_sdk_s3::types::error::{NoSuchKey, NotFound};
    use std::io;

    fn response(status: u16) -> HttpResponse {
        HttpResponse::new(status.try_into().unwrap(), SdkBody::empty())
    }

    fn denied() -> GetObjectError {
        GetObjectError::generic(
            ErrorMetadata::builder()
                .code("AccessDenied")
                .message("Access Denied")
                .build(),
        )
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let err: SdkError<GetObjectError, HttpResponse> =
            SdkError::timeout_error(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        let mapped = map_sdk_error(err);
        assert!(mapped.is_unavailable());
        assert_eq!(mapped.backend_name(), Some("s3"));
    }

    #[test]
    fn test_service_error_is_rejected_with_status() {
        let err = SdkError::service_error(denied(), response(403));
        match map_sdk_error(err) {
            BackendError::Rejected {
                backend,
                code,
                message,
                status,
            } => {
                assert_eq!(backend, "s3");
                assert_eq!(code, "AccessDenied");
                assert_eq!(message, "Access Denied");
                assert_eq!(status, Some(403));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_construction_failure_is_invalid_config() {
        let cause = io::Error::new(io::ErrorKind::InvalidInput, "no bucket");
        let err: SdkError<GetObjectError, HttpResponse> = SdkError::construction_failure(cause);
        assert!(matches!(
            map_sdk_error(err),
            BackendError::InvalidConfig { .. }
        ));
    }

    #[test]
    fn test_no_such_key_is_not_found() {
        let err = SdkError::service_error(
            GetObjectError::NoSuchKey(NoSuchKey::builder().message("gone").build()),
            response(404),
        );
        let mapped = map_get_error("docs/a.txt", err);
        assert!(mapped.is_not_found());
        assert!(mapped.to_string().contains("docs/a.txt"));
    }

    #[test]
    fn test_other_get_failures_keep_sdk_mapping() {
        let err = SdkError::service_error(denied(), response(403));
        let mapped = map_get_error("docs/a.txt", err);
        assert!(!mapped.is_not_found());
        assert_eq!(mapped.status(), Some(403));
    }

    #[test]
    fn test_head_404_means_missing() {
        let missing = SdkError::service_error(
            HeadObjectError::NotFound(NotFound::builder().build()),
            response(404),
        );
        assert!(is_missing_object(&missing));

        let forbidden = SdkError::service_error(
            HeadObjectError::generic(ErrorMetadata::builder().code("Forbidden").build()),
            response(403),
        );
        assert!(!is_missing_object(&forbidden));
        assert_eq!(map_sdk_error(forbidden).status(), Some(403));
    }
}
