//! Process-wide embedded cluster for the integration suites.
//!
//! Every suite binary shares one data directory. Bootstrap is serialised with
//! an advisory `flock` held until exit, and each binary stops the postmaster
//! it started when it exits, so the next binary finds the directory free.

use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const BOOTSTRAP_ATTEMPTS: usize = 5;
const BOOTSTRAP_BACKOFF: Duration = Duration::from_millis(500);
const CLUSTER_PASSWORD: &str = "blogstore_embedded_test";

/// Return the shared cluster, retrying transient bootstrap failures.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    pin_cluster_password();
    #[cfg(unix)]
    exit_hook::serialise_bootstrap()?;

    let mut attempt = 1;
    let handle = loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => break handle,
            Err(error) if attempt >= BOOTSTRAP_ATTEMPTS => return Err(error),
            Err(_) => {
                std::thread::sleep(BOOTSTRAP_BACKOFF);
                attempt += 1;
            }
        }
    };

    #[cfg(unix)]
    exit_hook::stop_postmaster_at_exit(handle);
    Ok(handle)
}

/// A reused data directory keeps the password it was initialised with, so
/// every binary must present the same one.
fn pin_cluster_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: only written while unset, before the cluster library reads it.
        unsafe {
            std::env::set_var("PG_PASSWORD", CLUSTER_PASSWORD);
        }
    }
}

#[cfg(unix)]
mod exit_hook {
    use std::fs::{File, OpenOptions};
    use std::os::fd::AsRawFd;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock, PoisonError};
    use std::time::Duration;

    use color_eyre::eyre::eyre;
    use pg_embedded_setup_unpriv::{BootstrapError, BootstrapResult, ClusterHandle};

    const LOCK_FILE: &str = "blogstore-pg-embedded.lock";
    const SHUTDOWN_POLLS: usize = 50;
    const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

    static BOOTSTRAP_LOCK: Mutex<Option<File>> = Mutex::new(None);
    static POSTMASTER: OnceLock<Postmaster> = OnceLock::new();

    struct Postmaster {
        pid: libc::pid_t,
        data_dir: PathBuf,
    }

    /// Take the cross-process bootstrap lock once per process.
    pub(super) fn serialise_bootstrap() -> BootstrapResult<()> {
        let mut held = BOOTSTRAP_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if held.is_some() {
            return Ok(());
        }

        let path = std::env::temp_dir().join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|err| BootstrapError::from(eyre!("open {}: {err}", path.display())))?;
        // SAFETY: `file` keeps the descriptor open for the duration of the call.
        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) } != 0 {
            let err = std::io::Error::last_os_error();
            return Err(BootstrapError::from(eyre!(
                "lock {}: {err}",
                path.display()
            )));
        }

        *held = Some(file);
        Ok(())
    }

    /// First line of `postmaster.pid`, if the file exists and parses.
    pub(super) fn postmaster_pid(data_dir: &Path) -> Option<libc::pid_t> {
        let dir = cap_std::fs::Dir::open_ambient_dir(data_dir, cap_std::ambient_authority()).ok()?;
        let content = dir.read_to_string("postmaster.pid").ok()?;
        content.lines().next()?.trim().parse().ok()
    }

    pub(super) fn stop_postmaster_at_exit(handle: &ClusterHandle) {
        let data_dir = handle.settings().data_dir.clone();
        let Some(pid) = postmaster_pid(&data_dir) else {
            return;
        };
        if POSTMASTER.set(Postmaster { pid, data_dir }).is_err() {
            return;
        }

        // SAFETY: `stop_postmaster` takes no arguments and never unwinds.
        if unsafe { libc::atexit(stop_postmaster) } != 0 {
            eprintln!("pg-embed: no exit hook registered; postmaster {pid} may outlive this binary");
        }
    }

    fn signal(pid: libc::pid_t, sig: libc::c_int) -> bool {
        // SAFETY: `pid` was read from this cluster's `postmaster.pid`.
        unsafe { libc::kill(pid, sig) == 0 }
    }

    /// SIGTERM, then SIGKILL if the postmaster is still up after five seconds.
    extern "C" fn stop_postmaster() {
        let Some(postmaster) = POSTMASTER.get() else {
            return;
        };
        // The PID may have been recycled since startup.
        if postmaster_pid(&postmaster.data_dir) != Some(postmaster.pid) {
            return;
        }
        if !signal(postmaster.pid, libc::SIGTERM) {
            return;
        }
        for _ in 0..SHUTDOWN_POLLS {
            std::thread::sleep(SHUTDOWN_POLL_INTERVAL);
            if !signal(postmaster.pid, 0) {
                return;
            }
        }
        signal(postmaster.pid, libc::SIGKILL);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    #[cfg(unix)]
    #[rstest]
    #[case::running("4242\n/var/lib/pg\n5432\n", Some(4242))]
    #[case::padded("  77 \n", Some(77))]
    #[case::garbled("postmaster\n", None)]
    #[case::empty("", None)]
    fn postmaster_pid_reads_the_first_line(#[case] content: &str, #[case] expected: Option<i32>) {
        let dir = tempfile::tempdir().expect("tempdir");
        cap_std::fs::Dir::open_ambient_dir(dir.path(), cap_std::ambient_authority())
            .expect("open dir")
            .write("postmaster.pid", content)
            .expect("write postmaster.pid");

        assert_eq!(super::exit_hook::postmaster_pid(dir.path()), expected);
    }

    #[cfg(unix)]
    #[rstest]
    fn postmaster_pid_is_none_without_a_pid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(super::exit_hook::postmaster_pid(dir.path()), None);
    }

    #[rstest]
    fn pinned_password_keeps_an_explicit_value() {
        let _guard = env_lock::lock_env([("PG_PASSWORD", Some("from_ci"))]);

        super::pin_cluster_password();

        assert_eq!(std::env::var("PG_PASSWORD").as_deref(), Ok("from_ci"));
    }
}
