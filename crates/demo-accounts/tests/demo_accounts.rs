//! Integration tests for the public demo account surface.

use demo_accounts::{
    DEFAULT_DEMO_SEED, DEMO_EMAIL_DOMAIN, DemoPlan, DemoRole, generate_demo_accounts,
};
use rstest::rstest;

#[rstest]
fn default_plan_has_one_admin_and_mixed_roles() {
    let plan = DemoPlan::default();
    assert_eq!(plan.seed(), DEFAULT_DEMO_SEED);

    let accounts = generate_demo_accounts(&plan).expect("default plan generates");
    assert_eq!(Some(accounts.len()), plan.total());
    assert_eq!(
        accounts.iter().filter(|a| a.role == DemoRole::Admin).count(),
        1
    );
}

#[rstest]
fn accounts_are_ordered_by_role_then_ordinal() {
    let accounts =
        generate_demo_accounts(&DemoPlan::new(5).with_counts(2, 1, 1)).expect("generated");
    let emails: Vec<_> = accounts.iter().map(|a| a.email.clone()).collect();
    assert_eq!(
        emails,
        vec![
            format!("patient.1@{DEMO_EMAIL_DOMAIN}"),
            format!("patient.2@{DEMO_EMAIL_DOMAIN}"),
            format!("doctor.1@{DEMO_EMAIL_DOMAIN}"),
            format!("admin.1@{DEMO_EMAIL_DOMAIN}"),
        ]
    );
}

#[rstest]
fn full_names_are_never_blank() {
    let accounts =
        generate_demo_accounts(&DemoPlan::new(11).with_counts(10, 5, 2)).expect("generated");
    assert!(accounts.iter().all(|a| !a.full_name.trim().is_empty()));
}
