mod alert;
mod enums;
mod job;
mod user;
mod user_job;

pub use alert::{
    Alert, AlertCriteria, AlertTriggerUpdate, LocationCriterion, NewAlert, SalaryBounds,
    UpdateAlert,
};
pub use enums::{
    AlertFrequency, ApplicationStatus, CompanySize, ExperienceLevel, JobType, SalaryPeriod,
};
pub use job::Job;
pub(crate) use job::group_thousands;
pub use user::{NewUser, PreferredSalary, UpdateProfile, User, UserPreferences};
pub use user_job::{AppliedJob, NewAppliedJob, NewSavedJob, SavedJob};

#[cfg(test)]
pub(crate) mod fixtures {
    pub use super::alert::fixtures::alert;
    pub use super::job::fixtures::job;
    pub use super::user::fixtures::user;
}
