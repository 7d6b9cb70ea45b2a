use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use fitdesk::domain::{
    derive_membership_fields, ending_date_for, initial_status, Member, MemberPatch, MemberStatus,
};

fn existing_member(status: MemberStatus, fees: f64) -> Member {
    let joining = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
    Member {
        id: Uuid::new_v4(),
        name: "Test".to_string(),
        mobile: "+919876543210".to_string(),
        joining_date: joining,
        ending_date: ending_date_for(joining, 3).unwrap(),
        month: 3,
        fees,
        description: None,
        status,
        is_active: true,
        created_at: joining,
        updated_at: joining,
    }
}

#[test]
fn ending_date_adds_calendar_months() {
    let joining = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
    let ending = ending_date_for(joining, 1).unwrap();
    // Calendar-month arithmetic clamps to the last day of February
    assert_eq!(ending, Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());

    let joining = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
    let ending = ending_date_for(joining, 12).unwrap();
    assert_eq!(ending, Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
}

#[test]
fn initial_status_follows_fee_payment() {
    assert_eq!(initial_status(1000.0), MemberStatus::Approved);
    assert_eq!(initial_status(0.0), MemberStatus::Pending);
}

#[test]
fn create_derives_all_fields() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let patch = MemberPatch {
        month: Some(6),
        fees: Some(3000.0),
        ..Default::default()
    };

    let derived = derive_membership_fields(None, &patch, now).unwrap();
    assert_eq!(derived.joining_date, now);
    assert_eq!(derived.month, 6);
    assert_eq!(derived.status, MemberStatus::Approved);
    assert_eq!(derived.ending_date, ending_date_for(now, 6).unwrap());
}

#[test]
fn create_without_month_is_rejected() {
    let patch = MemberPatch {
        fees: Some(1000.0),
        ..Default::default()
    };
    assert!(derive_membership_fields(None, &patch, Utc::now()).is_err());
}

#[test]
fn fee_payment_promotes_pending_member() {
    let current = existing_member(MemberStatus::Pending, 0.0);
    let patch = MemberPatch {
        fees: Some(1500.0),
        ..Default::default()
    };

    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(derived.status, MemberStatus::Approved);
    assert_eq!(derived.fees, 1500.0);
}

#[test]
fn fee_change_on_paid_member_keeps_status() {
    let current = existing_member(MemberStatus::Expired, 1000.0);
    let patch = MemberPatch {
        fees: Some(2000.0),
        ..Default::default()
    };

    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(derived.status, MemberStatus::Expired);
}

#[test]
fn explicit_status_wins_over_fee_transition() {
    let current = existing_member(MemberStatus::Pending, 0.0);
    let patch = MemberPatch {
        fees: Some(1500.0),
        status: Some(MemberStatus::Expired),
        ..Default::default()
    };

    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(derived.status, MemberStatus::Expired);
}

#[test]
fn patch_to_pending_is_rejected() {
    let current = existing_member(MemberStatus::Approved, 1000.0);
    let patch = MemberPatch {
        status: Some(MemberStatus::Pending),
        ..Default::default()
    };

    assert!(derive_membership_fields(Some(&current), &patch, Utc::now()).is_err());
}

#[test]
fn ending_date_recomputed_only_when_dates_change() {
    let current = existing_member(MemberStatus::Approved, 1000.0);

    // Unrelated patch leaves the ending date alone
    let patch = MemberPatch {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(derived.ending_date, current.ending_date);

    // Month change recomputes from the existing joining date
    let patch = MemberPatch {
        month: Some(6),
        ..Default::default()
    };
    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(
        derived.ending_date,
        ending_date_for(current.joining_date, 6).unwrap()
    );

    // Joining-date change recomputes with the existing month
    let new_joining = current.joining_date + Duration::days(10);
    let patch = MemberPatch {
        joining_date: Some(new_joining),
        ..Default::default()
    };
    let derived = derive_membership_fields(Some(&current), &patch, Utc::now()).unwrap();
    assert_eq!(
        derived.ending_date,
        ending_date_for(new_joining, current.month).unwrap()
    );
}

#[test]
fn effective_expiry_covers_past_due_approved() {
    let now = Utc::now();
    let mut member = existing_member(MemberStatus::Approved, 1000.0);

    member.ending_date = now + Duration::days(1);
    assert!(!member.is_effectively_expired(now));

    member.ending_date = now - Duration::days(1);
    assert!(member.is_effectively_expired(now));

    member.status = MemberStatus::Expired;
    member.ending_date = now + Duration::days(30);
    assert!(member.is_effectively_expired(now));

    member.status = MemberStatus::Pending;
    member.ending_date = now - Duration::days(30);
    assert!(!member.is_effectively_expired(now));
}
