//! Resource names and their required query parameters

/// Parameters every transaction-punch query must carry
pub const TRANSACTION_WINDOW: &[&str] =
    &["filterTransactionStartTimeUTC", "filterTransactionEndTimeUTC"];

/// Parameters every employee-schedule query must carry
pub const SCHEDULE_WINDOW: &[&str] = &["filterScheduleStartDate", "filterScheduleEndDate"];

pub const CLIENT_METADATA: &str = "ClientMetadata";
pub const EMPLOYEES: &str = "Employees";
pub const EMPLOYEE_RAW_PUNCHES: &str = "EmployeeRawPunches";
pub const EMPLOYEE_PUNCHES: &str = "EmployeePunches";
pub const REPORT_METADATA: &str = "ReportMetadata";
pub const REPORTS: &str = "Reports";

/// `Employees/{xref}`
pub fn employee(xref_code: &str) -> String {
    format!("{EMPLOYEES}/{xref_code}")
}

/// `Employees/{xref}/Schedules`
pub fn employee_schedules(xref_code: &str) -> String {
    format!("{EMPLOYEES}/{xref_code}/Schedules")
}

/// `ReportMetadata/{xref}`
pub fn report_metadata(xref_code: &str) -> String {
    format!("{REPORT_METADATA}/{xref_code}")
}

/// `Reports/{xref}`
pub fn report(xref_code: &str) -> String {
    format!("{REPORTS}/{xref_code}")
}

/// Query parameters a resource refuses to be queried without.
///
/// Matches on the resource path relative to the API base, so generic calls
/// get the same checks as the named wrappers.
pub fn required_params(resource: &str) -> &'static [&'static str] {
    let segments: Vec<&str> = resource.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        [EMPLOYEE_RAW_PUNCHES] | [EMPLOYEE_PUNCHES] => TRANSACTION_WINDOW,
        [EMPLOYEES, xref_code, "Schedules"] if !xref_code.is_empty() => SCHEDULE_WINDOW,
        _ => &[],
    }
}
