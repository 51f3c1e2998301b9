//! Diesel table definitions for the clinic schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Login accounts. Emails are stored lower-cased.
    identities (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        /// PHC-encoded salted hash.
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patient profiles, one per identity at most.
    patients (id) {
        id -> Int8,
        identity_id -> Int8,
        date_of_birth -> Date,
        blood_type -> Varchar,
        phone -> Varchar,
    }
}

diesel::table! {
    /// Doctor profiles, one per identity at most.
    doctors (id) {
        id -> Int8,
        identity_id -> Int8,
        specialization -> Varchar,
        phone -> Varchar,
    }
}

diesel::table! {
    /// Booked appointments.
    appointments (id) {
        id -> Int8,
        patient_id -> Int8,
        doctor_id -> Int8,
        /// Naive local timestamp merged from the booking date and time.
        appointment_date -> Timestamp,
        reason -> Text,
    }
}

diesel::joinable!(patients -> identities (identity_id));
diesel::joinable!(doctors -> identities (identity_id));
diesel::joinable!(appointments -> patients (patient_id));
diesel::joinable!(appointments -> doctors (doctor_id));

diesel::allow_tables_to_appear_in_same_query!(identities, patients, doctors, appointments);
