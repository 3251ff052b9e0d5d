//! The API endpoints URIs.
//!
//! Endpoints that take a parameter, e.g. '/api/income/{id}', name it with braces.

/// The root route which reports that the API is running.
pub const ROOT: &str = "/";

/// The route for registering a new user.
pub const SIGN_UP: &str = "/api/auth/signup";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for checking a bearer token and fetching its user.
pub const VERIFY: &str = "/api/auth/verify";
/// The route for starting password recovery.
pub const FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
/// The route for overwriting a password by email.
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";
/// The route for editing the logged-in user's profile.
pub const UPDATE_PROFILE: &str = "/api/auth/update-profile";
/// The route for changing the logged-in user's password.
pub const CHANGE_PASSWORD: &str = "/api/auth/change-password";

/// The route to create and list incomes.
pub const INCOMES: &str = "/api/income";
/// The route to edit or delete a single income.
pub const INCOME: &str = "/api/income/{id}";
/// The route to create and list expenses.
pub const EXPENSES: &str = "/api/expense";
/// The route to edit or delete a single expense.
pub const EXPENSE: &str = "/api/expense/{id}";

/// The route for the dashboard's totals, recent transactions and category breakdown.
pub const DASHBOARD_SUMMARY: &str = "/api/dashboard/summary";
