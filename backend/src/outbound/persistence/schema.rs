//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Administrative areas scoping every report query.
    barangays (id) {
        id -> Uuid,
        name -> Varchar,
        municipality -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Portal accounts. `role` holds the upper-case role name.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        display_name -> Varchar,
        password_hash -> Text,
        role -> Varchar,
        is_verified -> Bool,
        barangay_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// External agencies reports can be referred to.
    referral_agencies (id) {
        id -> Uuid,
        name -> Varchar,
        agency_type -> Varchar,
        contact_person -> Varchar,
        contact_number -> Varchar,
        email -> Nullable<Varchar>,
        response_time_hours -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Traffic reports.
    ///
    /// Referral columns are a snapshot taken at referral time. Archive columns
    /// are populated exactly while `is_archived` holds.
    reports (id) {
        id -> Uuid,
        code -> Varchar,
        barangay_id -> Uuid,
        category -> Varchar,
        severity -> Varchar,
        location -> Varchar,
        description -> Text,
        status -> Varchar,
        reported_by -> Uuid,
        assigned_to -> Nullable<Uuid>,
        referred_agency_id -> Nullable<Uuid>,
        referred_agency_name -> Nullable<Varchar>,
        referral_contact -> Nullable<Varchar>,
        referral_reason -> Nullable<Text>,
        referred_at -> Nullable<Timestamptz>,
        resolution_notes -> Nullable<Text>,
        is_archived -> Bool,
        archived_at -> Nullable<Timestamptz>,
        archived_from -> Nullable<Varchar>,
        scheduled_deletion -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail; a trigger rejects updates and deletes.
    report_audit_log (id) {
        id -> Uuid,
        report_id -> Uuid,
        action -> Varchar,
        old_value -> Nullable<Varchar>,
        new_value -> Varchar,
        acted_by -> Uuid,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(users -> barangays (barangay_id));
diesel::joinable!(reports -> barangays (barangay_id));
diesel::joinable!(report_audit_log -> reports (report_id));

diesel::allow_tables_to_appear_in_same_query!(
    barangays,
    users,
    referral_agencies,
    reports,
    report_audit_log,
);
