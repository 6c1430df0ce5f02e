//! End-to-end workflow tests: `ReliefService` over an in-memory `SqliteStore`.

use std::sync::Arc;

use chrono::NaiveDate;
use relief_core::{
  Error, Identity, ReliefService, Role,
  duplicate::DuplicateReason,
  identity::SubjectAttribute,
  policy::{self, Decision, Effect, NewPolicy, actions, resources},
  request::{NewMedia, ReliefDetails, RequestStatus},
};
use relief_store_sqlite::SqliteStore;
use uuid::Uuid;

async fn bare_service() -> ReliefService<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  ReliefService::new(Arc::new(store))
}

async fn service() -> ReliefService<SqliteStore> {
  let svc = bare_service().await;
  svc.bootstrap_policies(policy::default_policies()).await.unwrap();
  svc
}

fn details(district: &str, division: &str, household: &str, nic: &str) -> ReliefDetails {
  ReliefDetails {
    gn_id:            Some("GN-7".into()),
    gn_division:      "Sedawatta".into(),
    ds_division:      division.into(),
    district:         district.into(),
    household_id:     household.into(),
    census_block:     None,
    census_unit:      None,
    incident_type:    "Flood".into(),
    start_date:       NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
    end_date:         None,
    ownership_status: Some("tenant".into()),
    is_estate:        false,
    damage_zone:      None,
    damage_severity:  Some("severe".into()),
    relief_amount:    50_000,
    bank_name:        "People's Bank".into(),
    branch_name:      None,
    account_holder:   "R. Fernando".into(),
    account_number:   "204455".into(),
    account_nic:      nic.into(),
  }
}

fn colombo(household: &str, nic: &str) -> ReliefDetails {
  details("Colombo", "Kolonnawa DS", household, nic)
}

fn super_user() -> Identity { Identity::new(Uuid::new_v4(), Role::SuperUser) }

fn national() -> Identity { Identity::new(Uuid::new_v4(), Role::NationalOfficer) }

fn district_officer(district: &str) -> Identity {
  Identity::new(Uuid::new_v4(), Role::DistrictOfficer).with_district(district)
}

fn division_officer(division: &str) -> Identity {
  Identity::new(Uuid::new_v4(), Role::DivisionOfficer).with_ds_division(division)
}

fn gn_officer() -> Identity {
  Identity::new(Uuid::new_v4(), Role::GnOfficer).with_gn_division("Sedawatta")
}

fn volunteer() -> Identity { Identity::new(Uuid::new_v4(), Role::UnVolunteer) }

// ─── Policy evaluation ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
  let svc = service().await;
  let result = svc.evaluate_policy(None, resources::RELIEF_REQUEST, actions::READ).await;
  assert!(matches!(result, Err(Error::Unauthenticated)));
}

#[tokio::test]
async fn super_user_bypasses_empty_policy_table() {
  let svc = bare_service().await;
  let decision = svc
    .evaluate_policy(Some(&super_user()), "page:anything", "anything")
    .await
    .unwrap();
  assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn no_matching_policy_denies() {
  let svc = bare_service().await;
  let decision = svc
    .evaluate_policy(Some(&national()), resources::RELIEF_REQUEST, actions::READ)
    .await
    .unwrap();
  assert_eq!(decision, Decision::Deny);

  let result = svc.list_relief_requests(&national(), None).await;
  assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn higher_priority_deny_overrides_allow() {
  let svc = service().await;
  let root = super_user();
  svc
    .create_policy(
      &root,
      NewPolicy::new("freeze-gn-create", resources::RELIEF_REQUEST, "*", Effect::Deny)
        .with_subject(SubjectAttribute::Role, "GN Officer")
        .with_priority(100),
    )
    .await
    .unwrap();

  let gn = gn_officer();
  let decision = svc
    .evaluate_policy(Some(&gn), resources::RELIEF_REQUEST, actions::CREATE)
    .await
    .unwrap();
  assert_eq!(decision, Decision::Deny);

  // Other roles keep their grants.
  let decision = svc
    .evaluate_policy(Some(&volunteer()), resources::RELIEF_REQUEST, actions::CREATE)
    .await
    .unwrap();
  assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn subject_attribute_narrows_a_grant() {
  let svc = bare_service().await;
  let root = super_user();
  svc
    .create_policy(
      &root,
      NewPolicy::new("colombo-dashboard", resources::DASHBOARD, actions::READ, Effect::Allow)
        .with_subject(SubjectAttribute::District, "Colombo"),
    )
    .await
    .unwrap();

  let allowed = svc
    .evaluate_policy(Some(&district_officer("Colombo")), resources::DASHBOARD, actions::READ)
    .await
    .unwrap();
  let denied = svc
    .evaluate_policy(Some(&district_officer("Kandy")), resources::DASHBOARD, actions::READ)
    .await
    .unwrap();
  assert_eq!((allowed, denied), (Decision::Allow, Decision::Deny));
}

// ─── Creation and duplicates ─────────────────────────────────────────────────

#[tokio::test]
async fn create_records_entry_officer_and_media() {
  let svc = service().await;
  let gn = gn_officer();
  let media = vec![NewMedia {
    file_url:      "https://files.example/roof.jpg".into(),
    file_type:     "image/jpeg".into(),
    original_name: "roof.jpg".into(),
  }];

  let created = svc.create_relief_request(&gn, colombo("HH-1", "851234567V"), media).await.unwrap();
  assert_eq!(created.status, RequestStatus::Pending);
  assert_eq!(created.data_entered_by, gn.id);
  assert_eq!(created.media.len(), 1);
  assert!(!created.is_duplicate);
}

#[tokio::test]
async fn invalid_details_are_rejected_before_storage() {
  let svc = service().await;
  let gn = gn_officer();
  let mut bad = colombo("HH-1", "1V");
  bad.account_nic = "  ".into();

  let result = svc.create_relief_request(&gn, bad, vec![]).await;
  assert!(matches!(result, Err(Error::Validation(_))));
  assert!(svc.list_relief_requests(&national(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn ground_level_duplicate_is_flagged() {
  let svc = service().await;
  let gn = gn_officer();
  let original = svc.create_relief_request(&gn, colombo("HH-1", "111V"), vec![]).await.unwrap();

  let repeat = svc.create_relief_request(&gn, colombo("HH-9", "111V"), vec![]).await.unwrap();
  assert!(repeat.is_duplicate);
  assert_eq!(repeat.original_request_id, Some(original.id));
  assert!(repeat.duplicate_reason.unwrap().contains("NIC 111V"));
}

#[tokio::test]
async fn household_and_incident_match_is_a_duplicate() {
  let svc = service().await;
  let vol = volunteer();
  let original = svc.create_relief_request(&vol, colombo("HH-1", "1V"), vec![]).await.unwrap();

  let repeat = svc.create_relief_request(&vol, colombo("HH-1", "2V"), vec![]).await.unwrap();
  assert!(repeat.is_duplicate);
  assert_eq!(repeat.original_request_id, Some(original.id));

  let mut other_incident = colombo("HH-1", "3V");
  other_incident.incident_type = "Landslide".into();
  let fresh = svc.create_relief_request(&vol, other_incident, vec![]).await.unwrap();
  assert!(!fresh.is_duplicate);
}

#[tokio::test]
async fn officer_duplicate_is_refused_and_not_stored() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let original = svc.create_relief_request(&officer, colombo("HH-1", "222V"), vec![]).await.unwrap();

  let result = svc.create_relief_request(&officer, colombo("HH-2", "222V"), vec![]).await;
  let Err(Error::DuplicateConflict(found)) = result else {
    panic!("expected duplicate conflict, got {result:?}");
  };
  assert_eq!(found.original_request_id, original.id);
  assert!(matches!(found.reason, DuplicateReason::Nic { .. }));

  let visible = svc.list_relief_requests(&national(), None).await.unwrap();
  assert_eq!(visible.len(), 1);
}

#[tokio::test]
async fn rejected_request_does_not_block_resubmission() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let first = svc.create_relief_request(&officer, colombo("HH-1", "333V"), vec![]).await.unwrap();
  svc
    .update_relief_request_status(&officer, first.id, RequestStatus::Rejected, Some("no damage".into()))
    .await
    .unwrap();

  let second = svc.create_relief_request(&officer, colombo("HH-1", "333V"), vec![]).await.unwrap();
  assert!(!second.is_duplicate);
}

#[tokio::test]
async fn nic_match_takes_precedence_over_household() {
  let svc = service().await;
  let gn = gn_officer();
  let by_nic = svc.create_relief_request(&gn, colombo("HH-A", "444V"), vec![]).await.unwrap();
  svc.create_relief_request(&gn, colombo("HH-B", "555V"), vec![]).await.unwrap();

  let repeat = svc.create_relief_request(&gn, colombo("HH-B", "444V"), vec![]).await.unwrap();
  assert_eq!(repeat.original_request_id, Some(by_nic.id));
}

// ─── Scope ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_are_narrowed_to_the_callers_area() {
  let svc = service().await;
  let root = super_user();
  let in_colombo = svc.create_relief_request(&root, colombo("HH-1", "1V"), vec![]).await.unwrap();
  let in_kandy = svc
    .create_relief_request(&root, details("Kandy", "Gangawata DS", "HH-2", "2V"), vec![])
    .await
    .unwrap();

  let officer = district_officer("Colombo");
  let visible = svc.list_relief_requests(&officer, None).await.unwrap();
  assert_eq!(visible.iter().map(|r| r.id).collect::<Vec<_>>(), [in_colombo.id]);

  let division = division_officer("Gangawata DS");
  let visible = svc.list_relief_requests(&division, None).await.unwrap();
  assert_eq!(visible.iter().map(|r| r.id).collect::<Vec<_>>(), [in_kandy.id]);

  assert!(svc.get_relief_request(&officer, in_colombo.id).await.is_ok());
  let hidden = svc.get_relief_request(&officer, in_kandy.id).await;
  assert!(matches!(hidden, Err(Error::RequestNotFound(_))));

  assert_eq!(svc.list_relief_requests(&national(), None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn officer_without_area_sees_nothing() {
  let svc = service().await;
  let root = super_user();
  svc.create_relief_request(&root, colombo("HH-1", "1V"), vec![]).await.unwrap();

  let unplaced = Identity::new(Uuid::new_v4(), Role::DistrictOfficer);
  assert!(svc.list_relief_requests(&unplaced, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn gn_officer_sees_only_own_entries() {
  let svc = service().await;
  let mine = gn_officer();
  let theirs = gn_officer();
  let own = svc.create_relief_request(&mine, colombo("HH-1", "1V"), vec![]).await.unwrap();
  svc.create_relief_request(&theirs, colombo("HH-2", "2V"), vec![]).await.unwrap();

  let visible = svc.list_relief_requests(&mine, None).await.unwrap();
  assert_eq!(visible.iter().map(|r| r.id).collect::<Vec<_>>(), [own.id]);
}

#[tokio::test]
async fn out_of_area_review_is_forbidden() {
  let svc = service().await;
  let root = super_user();
  let in_kandy = svc
    .create_relief_request(&root, details("Kandy", "Gangawata DS", "HH-2", "2V"), vec![])
    .await
    .unwrap();

  let result = svc
    .update_relief_request_status(
      &district_officer("Colombo"),
      in_kandy.id,
      RequestStatus::Approved,
      None,
    )
    .await;
  assert!(matches!(result, Err(Error::Forbidden(_))));

  let stored = svc.get_relief_request(&root, in_kandy.id).await.unwrap();
  assert_eq!(stored.status, RequestStatus::Pending);
}

#[tokio::test]
async fn other_division_cannot_reject() {
  let svc = service().await;
  let request = svc
    .create_relief_request(&gn_officer(), colombo("HH-1", "1V"), vec![])
    .await
    .unwrap();
  let outsider = division_officer("Other DS");

  for remarks in [None, Some("x".to_owned())] {
    let result = svc
      .update_relief_request_status(&outsider, request.id, RequestStatus::Rejected, remarks)
      .await;
    assert!(matches!(result, Err(Error::Forbidden(_))), "got {result:?}");
  }

  let stored = svc.get_relief_request(&super_user(), request.id).await.unwrap();
  assert_eq!(stored.status, RequestStatus::Pending);
}

// ─── Status lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn approval_records_reviewer_and_is_final() {
  let svc = service().await;
  let gn = gn_officer();
  let officer = division_officer("Kolonnawa DS");
  let request = svc.create_relief_request(&gn, colombo("HH-1", "1V"), vec![]).await.unwrap();

  let approved = svc
    .update_relief_request_status(&officer, request.id, RequestStatus::Approved, Some("  ok  ".into()))
    .await
    .unwrap();
  assert_eq!(approved.status, RequestStatus::Approved);
  assert_eq!(approved.action_by, Some(officer.id));
  assert_eq!(approved.remarks.as_deref(), Some("ok"));

  let again = svc
    .update_relief_request_status(&officer, request.id, RequestStatus::Rejected, Some("late".into()))
    .await;
  assert!(matches!(
    again,
    Err(Error::InvalidTransition { status: RequestStatus::Approved, .. })
  ));
}

#[tokio::test]
async fn rejection_requires_remarks() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();

  for remarks in [None, Some("   ".to_owned())] {
    let result = svc
      .update_relief_request_status(&officer, request.id, RequestStatus::Rejected, remarks)
      .await;
    assert!(matches!(result, Err(Error::Validation(_))));
  }

  let result = svc
    .update_relief_request_status(&officer, request.id, RequestStatus::Pending, None)
    .await;
  assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn ground_level_roles_cannot_review() {
  let svc = service().await;
  let root = super_user();
  let gn = gn_officer();
  let request = svc.create_relief_request(&gn, colombo("HH-1", "1V"), vec![]).await.unwrap();

  // Even an explicit grant does not let a GN officer review.
  svc
    .create_policy(
      &root,
      NewPolicy::new("gn-review", resources::RELIEF_REQUEST, actions::UPDATE_STATUS, Effect::Allow)
        .with_subject(SubjectAttribute::Role, "GN Officer"),
    )
    .await
    .unwrap();

  let result = svc
    .update_relief_request_status(&gn, request.id, RequestStatus::Approved, None)
    .await;
  assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn concurrent_reviews_apply_exactly_once() {
  let svc = service().await;
  let officer = national();
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();

  let (a, b) = tokio::join!(
    svc.update_relief_request_status(&officer, request.id, RequestStatus::Approved, None),
    svc.update_relief_request_status(
      &officer,
      request.id,
      RequestStatus::Rejected,
      Some("conflicting".into())
    ),
  );
  let succeeded = [a.is_ok(), b.is_ok()].into_iter().filter(|ok| *ok).count();
  assert_eq!(succeeded, 1);
  for result in [a, b] {
    if let Err(e) = result {
      assert!(matches!(e, Error::InvalidTransition { .. }), "unexpected error {e:?}");
    }
  }
}

#[tokio::test]
async fn unknown_request_is_not_found() {
  let svc = service().await;
  for status in [RequestStatus::Approved, RequestStatus::Rejected] {
    let result = svc
      .update_relief_request_status(&national(), Uuid::new_v4(), status, None)
      .await;
    assert!(matches!(result, Err(Error::RequestNotFound(_))), "got {result:?}");
  }
}

#[tokio::test]
async fn repeated_reads_return_the_same_record() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let media = vec![NewMedia {
    file_url:      "https://files.example/wall.jpg".into(),
    file_type:     "image/jpeg".into(),
    original_name: "wall.jpg".into(),
  }];
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), media).await.unwrap();

  let first = svc.get_relief_request(&officer, request.id).await.unwrap();
  let second = svc.get_relief_request(&officer, request.id).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.status, RequestStatus::Pending);
  assert_eq!(first.media.len(), 1);
}

// ─── Volunteers ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn assigned_volunteer_gains_visibility() {
  let svc = service().await;
  let officer = national();
  let vol = volunteer();
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();
  assert!(svc.list_relief_requests(&vol, None).await.unwrap().is_empty());

  let assigned = svc.assign_volunteer(&officer, request.id, vol.id).await.unwrap();
  assert_eq!(assigned.assigned_volunteer_id, Some(vol.id));
  assert_eq!(assigned.status, RequestStatus::Pending);

  let visible = svc.list_relief_requests(&vol, None).await.unwrap();
  assert_eq!(visible.len(), 1);
  assert!(svc.get_relief_request(&vol, request.id).await.is_ok());
}

#[tokio::test]
async fn only_national_tier_assigns_volunteers() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();

  let result = svc.assign_volunteer(&officer, request.id, Uuid::new_v4()).await;
  assert!(matches!(result, Err(Error::Forbidden(_))));
}

// ─── Soft delete and statistics ──────────────────────────────────────────────

#[tokio::test]
async fn deleted_request_vanishes_everywhere() {
  let svc = service().await;
  let officer = national();
  let request = svc.create_relief_request(&officer, colombo("HH-1", "999V"), vec![]).await.unwrap();

  svc.delete_relief_request(&officer, request.id).await.unwrap();

  assert!(matches!(
    svc.get_relief_request(&officer, request.id).await,
    Err(Error::RequestNotFound(_))
  ));
  assert!(svc.list_relief_requests(&officer, None).await.unwrap().is_empty());
  assert!(svc.district_stats(&officer).await.unwrap().is_empty());
  assert!(matches!(
    svc.delete_relief_request(&officer, request.id).await,
    Err(Error::RequestNotFound(_))
  ));

  // No longer blocks a fresh submission.
  let fresh = svc.create_relief_request(&officer, colombo("HH-1", "999V"), vec![]).await.unwrap();
  assert!(!fresh.is_duplicate);
}

#[tokio::test]
async fn only_granted_roles_delete() {
  let svc = service().await;
  let officer = district_officer("Colombo");
  let request = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();
  assert!(matches!(
    svc.delete_relief_request(&officer, request.id).await,
    Err(Error::Forbidden(_))
  ));
}

#[tokio::test]
async fn district_stats_count_by_status() {
  let svc = service().await;
  let officer = national();
  let a = svc.create_relief_request(&officer, colombo("HH-1", "1V"), vec![]).await.unwrap();
  svc.create_relief_request(&officer, colombo("HH-2", "2V"), vec![]).await.unwrap();
  svc
    .create_relief_request(&officer, details("Matara", "Weligama DS", "HH-3", "3V"), vec![])
    .await
    .unwrap();
  svc
    .update_relief_request_status(&officer, a.id, RequestStatus::Approved, None)
    .await
    .unwrap();

  let stats = svc.district_stats(&officer).await.unwrap();
  assert_eq!(stats.len(), 2);
  assert_eq!(stats["Colombo"].approved, 1);
  assert_eq!(stats["Colombo"].pending, 1);
  assert_eq!(stats["Colombo"].total, 2);
  assert_eq!(stats["Matara"].total, 1);

  let result = svc.district_stats(&gn_officer()).await;
  assert!(matches!(result, Err(Error::Forbidden(_))));
}

// ─── Policy administration ───────────────────────────────────────────────────

#[tokio::test]
async fn policy_admin_round_trip() {
  let svc = bare_service().await;
  let root = super_user();
  let grant = NewPolicy::new("vol-read", resources::RELIEF_REQUEST, actions::READ, Effect::Allow)
    .with_subject(SubjectAttribute::Role, "UN Volunteer");

  svc.create_policy(&root, grant.clone()).await.unwrap();
  assert!(matches!(
    svc.create_policy(&root, grant.clone()).await,
    Err(Error::Conflict(_))
  ));

  let renamed = NewPolicy { name: "volunteer-read".into(), ..grant.clone() }.with_priority(3);
  let updated = svc.update_policy(&root, "vol-read", renamed).await.unwrap();
  assert_eq!(updated.name, "volunteer-read");
  assert_eq!(updated.priority, 3);
  assert!(matches!(
    svc.get_policy(&root, "vol-read").await,
    Err(Error::PolicyNotFound(_))
  ));

  svc.delete_policy(&root, "volunteer-read").await.unwrap();
  assert!(svc.list_policies(&root).await.unwrap().is_empty());
  assert!(matches!(
    svc.delete_policy(&root, "volunteer-read").await,
    Err(Error::PolicyNotFound(_))
  ));
}

#[tokio::test]
async fn rename_onto_existing_policy_conflicts() {
  let svc = bare_service().await;
  let root = super_user();
  let a = NewPolicy::new("a", resources::DASHBOARD, actions::READ, Effect::Allow);
  let b = NewPolicy::new("b", resources::DASHBOARD, actions::READ, Effect::Deny);
  svc.create_policy(&root, a).await.unwrap();
  svc.create_policy(&root, b.clone()).await.unwrap();

  let result = svc.update_policy(&root, "b", NewPolicy { name: "a".into(), ..b }).await;
  assert!(matches!(result, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn malformed_policy_is_rejected() {
  let svc = bare_service().await;
  let root = super_user();
  let bad = NewPolicy::new("bad", resources::DASHBOARD, actions::READ, Effect::Allow)
    .with_subject(SubjectAttribute::Role, "Mayor");
  assert!(matches!(svc.create_policy(&root, bad).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn policy_admin_requires_manage_grant() {
  let svc = service().await;
  let result = svc.list_policies(&national()).await;
  assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[tokio::test]
async fn bootstrap_skips_existing_policies() {
  let svc = bare_service().await;
  let count = policy::default_policies().len();
  assert_eq!(svc.bootstrap_policies(policy::default_policies()).await.unwrap(), count);
  assert_eq!(svc.bootstrap_policies(policy::default_policies()).await.unwrap(), 0);
  assert_eq!(svc.list_policies(&super_user()).await.unwrap().len(), count);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn field_entry_through_district_review() {
  let svc = service().await;
  let gn = gn_officer();
  let reviewer = district_officer("Colombo");

  let first = svc.create_relief_request(&gn, colombo("HH-10", "900000001V"), vec![]).await.unwrap();
  let repeat = svc.create_relief_request(&gn, colombo("HH-10", "900000002V"), vec![]).await.unwrap();
  assert!(repeat.is_duplicate);

  let queue = svc
    .list_relief_requests(&reviewer, Some(RequestStatus::Pending))
    .await
    .unwrap();
  assert_eq!(queue.len(), 2);
  assert_eq!(queue[0].id, repeat.id, "newest first");

  let approved = svc
    .update_relief_request_status(&reviewer, first.id, RequestStatus::Approved, Some("verified".into()))
    .await
    .unwrap();
  assert_eq!(approved.action_by, Some(reviewer.id));
  assert_eq!(approved.remarks.as_deref(), Some("verified"));
  svc
    .update_relief_request_status(
      &reviewer,
      repeat.id,
      RequestStatus::Rejected,
      Some("duplicate of an approved claim".into()),
    )
    .await
    .unwrap();

  let stats = svc.district_stats(&reviewer).await.unwrap();
  let colombo_stats = stats["Colombo"];
  assert_eq!(
    (colombo_stats.pending, colombo_stats.approved, colombo_stats.rejected),
    (0, 1, 1)
  );
}
