use std::sync::{
    LockResult,
    MutexGuard,
};

use host_lib::test_stand::NotConfiguredError;

use crate::{
    Context,
    config::Config,
    jig::Jig,
    report::Report,
    target::Target,
};


/// An instance of the test stand
///
/// Used to access all resources that a test run requires.
pub struct TestStand {
    pub guard:  LockResult<MutexGuard<'static, ()>>,
    pub jig:    Jig,
    pub target: Target,
}

impl TestStand {
    /// Initializes the test stand
    ///
    /// Reads the `test-stand.toml` configuration file and initializes test
    /// stand resources, as configured in there.
    pub fn new() -> Result<Self, TestStandInitError> {
        let test_stand = host_lib::TestStand::new()
            .map_err(|err| TestStandInitError::Inner(err))?;

        Self::from_inner(test_stand)
    }

    /// Initializes the test stand from the given configuration
    pub fn with_config(config: host_lib::Config)
        -> Result<Self, TestStandInitError>
    {
        let test_stand = host_lib::TestStand::with_config(config)
            .map_err(|err| TestStandInitError::Inner(err))?;

        Self::from_inner(test_stand)
    }

    fn from_inner(test_stand: host_lib::TestStand)
        -> Result<Self, TestStandInitError>
    {
        let timeout = test_stand.config.timeout();

        Ok(
            Self {
                guard:  test_stand.guard,
                jig:    Jig::new(test_stand.jig?, timeout),
                target: Target::new(test_stand.target?, timeout),
            }
        )
    }

    /// Split the test stand into the lock guard and a test context
    ///
    /// The guard needs to be kept around for as long as the context is used.
    pub fn into_context<R>(self, config: Config, report: R)
        -> (LockResult<MutexGuard<'static, ()>>, Context<Jig, Target, R>)
        where R: Report
    {
        let context = Context::new(self.jig, self.target, config, report);
        (self.guard, context)
    }
}


#[derive(Debug)]
pub enum TestStandInitError {
    Inner(host_lib::test_stand::TestStandInitError),
    NotConfigured(NotConfiguredError),
}

impl From<NotConfiguredError> for TestStandInitError {
    fn from(err: NotConfiguredError) -> Self {
        Self::NotConfigured(err)
    }
}
