use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Plain-text index served at `/api/contacts`.
pub const CONTACTS_BANNER: &str = "Contacts API routes: \
GET /api/contacts/get/all, \
GET /api/contacts/get/:id, \
POST /api/contacts/create, \
PUT /api/contacts/update/:id, \
DELETE /api/contacts/delete/:id";
