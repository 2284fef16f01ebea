use crate::errors::PromiseError;

/// Return value of an executor closure.
///
/// An executor either returns nothing and reports its outcome only through
/// `resolve`/`reject`, or returns a `Result` whose `Err` rejects the promise
/// the same way a synchronous throw would. An `Err` returned after the promise
/// already settled is ignored.
pub trait ExecutorOutcome {
    fn into_outcome(self) -> Result<(), PromiseError>;
}

impl ExecutorOutcome for () {
    fn into_outcome(self) -> Result<(), PromiseError> {
        Ok(())
    }
}

impl<E> ExecutorOutcome for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> Result<(), PromiseError> {
        self.map_err(PromiseError::rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_is_success() {
        assert!(().into_outcome().is_ok());
    }

    #[test]
    fn test_err_becomes_rejection() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "socket closed"));

        let err = result.into_outcome().unwrap_err();
        let reason = err.downcast_ref::<std::io::Error>().map(|e| e.to_string());
        assert_eq!(reason.as_deref(), Some("socket closed"));
    }

    #[test]
    fn test_anyhow_err_becomes_rejection() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("bad input"));

        let err = result.into_outcome().unwrap_err();
        assert_eq!(err.to_string(), "Promise rejected: bad input");
    }
}
