use std::sync::{
    LockResult,
    Mutex,
    MutexGuard,
};

use lazy_static::lazy_static;

use crate::{
    config::{
        Config,
        ConfigReadError,
    },
    conn::{
        Conn,
        ConnInitError,
    },
};


/// An instance of the test stand
///
/// Holds the connections to the test jig and the test target.
pub struct TestStand {
    /// Guarantees exclusive access to the test stand hardware
    ///
    /// Must not be dropped while this exclusive access is required. Once it is
    /// dropped, another test case might start running immediately.
    pub guard: LockResult<MutexGuard<'static, ()>>,

    /// Connection to the test jig
    ///
    /// This field will be `Err`, if the test jig has not been specified in the
    /// configuration file.
    pub jig: Result<Conn, NotConfiguredError>,

    /// Connection to the test target
    ///
    /// This field will be `Err`, if the test target has not been specified in
    /// the configuration file.
    pub target: Result<Conn, NotConfiguredError>,

    /// The configuration the connections were opened with
    pub config: Config,
}

impl TestStand {
    /// Create a new instance of `TestStand` from `test-stand.toml`
    pub fn new() -> Result<Self, TestStandInitError> {
        let config = Config::read()
            .map_err(|err| TestStandInitError::ConfigRead(err))?;

        Self::with_config(config)
    }

    /// Create a new instance of `TestStand` from an already loaded config
    pub fn with_config(config: Config) -> Result<Self, TestStandInitError> {
        // The test harness runs tests on parallel threads, but there is only
        // one test stand. Holding this lock for the lifetime of `TestStand`
        // serializes everything that uses the hardware. A poisoned lock is
        // still a held lock, so the `LockResult` is stored as it is.
        lazy_static! { static ref MUTEX: Mutex<()> = Mutex::new(()); }
        let guard = MUTEX.lock();

        let mut jig    = Err(NotConfiguredError("jig"));
        let mut target = Err(NotConfiguredError("target"));

        if let Some(path) = &config.jig {
            jig = Ok(
                Conn::new(path, config.baud_rate, config.timeout())
                    .map_err(|err| TestStandInitError::ConnInit(err))?
            );
        }
        if let Some(path) = &config.target {
            target = Ok(
                Conn::new(path, config.baud_rate, config.timeout())
                    .map_err(|err| TestStandInitError::ConnInit(err))?
            );
        }

        Ok(
            Self {
                guard,
                jig,
                target,
                config,
            },
        )
    }
}


/// Error initializing the test stand
#[derive(Debug)]
pub enum TestStandInitError {
    /// Error reading configuration
    ConfigRead(ConfigReadError),

    /// Error initializing a serial connection
    ConnInit(ConnInitError),
}

/// The resource you tried to access was not specified in the configuration file
///
/// If something isn't specified the configuration file, it is not going to be
/// available.
#[derive(Clone, Copy, Debug)]
pub struct NotConfiguredError(pub &'static str);
