use std::fmt;

/// Represents the counters of a synchronization run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub folders_synced: usize,
    pub folders_skipped: usize,
    pub emails_copied: usize,
    pub emails_present: usize,
    pub emails_filtered: usize,
    pub simulated: bool,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} folder(s) synchronized, {} skipped; {} email(s) copied, {} already present, {} filtered out",
            self.folders_synced,
            self.folders_skipped,
            self.emails_copied,
            self.emails_present,
            self.emails_filtered,
        )?;

        if self.simulated {
            write!(f, "\nsimulated run, no action taken")?;
        }

        Ok(())
    }
}
