//! Result type alias for Loglens

use super::errors::LoglensError;

/// Result type alias for Loglens operations
///
/// # Examples
///
/// ```
/// use loglens::domain::result::Result;
/// use loglens::domain::errors::LoglensError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(LoglensError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, LoglensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{FetchError, LoglensError};

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_fetch_error_propagates_with_question_mark() {
        fn inner() -> std::result::Result<(), FetchError> {
            Err(FetchError::InvalidResponse("missing events".to_string()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(LoglensError::Fetch(_))));
    }
}
