use sticky::common::DEFAULT_ALIAS;
use sticky::errors::StickyResult;
use sticky::store::memory::InMemoryClient;
use sticky::store::Database;
use sticky::Sticky;
use std::backtrace::Backtrace;
use std::time::Instant;

/// Runs `test` between `before` and `after`, reporting failures and panics with context.
///
/// `after` runs even when the test fails so every test leaves a clean database.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> StickyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> StickyResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> StickyResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => match after(ctx) {
                    Ok(_) => Ok(()),
                    Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                },
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", panic_err.type_id())
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", error);
}

#[derive(Clone)]
pub struct TestContext {
    database_name: String,
    sticky: Sticky,
}

impl TestContext {
    pub fn new(database_name: String, sticky: Sticky) -> Self {
        Self {
            database_name,
            sticky,
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn sticky(&self) -> Sticky {
        self.sticky.clone()
    }

    pub fn database(&self) -> StickyResult<Database> {
        self.sticky.database(DEFAULT_ALIAS)
    }
}

pub fn random_database_name() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

/// A fresh in-memory connection under the default alias.
pub fn create_test_context() -> StickyResult<TestContext> {
    let database_name = random_database_name();
    let sticky = Sticky::builder()
        .connect(&database_name, InMemoryClient::connect())
        .open()?;
    Ok(TestContext::new(database_name, sticky))
}

/// Drops every collection of the default database.
pub fn cleanup(ctx: TestContext) -> StickyResult<()> {
    let database = ctx.database()?;
    for name in database.list_collection_names()? {
        database.drop_collection(&name)?;
    }
    Ok(())
}
