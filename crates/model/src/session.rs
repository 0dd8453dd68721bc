use std::ops::{Deref, DerefMut};

use mongodb::bson::oid::ObjectId;
use mongodb::ClientSession;

/// A MongoDB client session threaded through every storage call, carrying the
/// acting admin when the request came through the admin surface.
pub struct Session {
    client_session: ClientSession,
    actor: Option<ObjectId>,
}

impl Session {
    pub fn new(client_session: ClientSession) -> Self {
        Session {
            client_session,
            actor: None,
        }
    }

    pub fn actor(&self) -> Option<ObjectId> {
        self.actor
    }

    pub fn set_actor(&mut self, actor: ObjectId) {
        self.actor = Some(actor);
    }
}

impl Deref for Session {
    type Target = ClientSession;

    fn deref(&self) -> &Self::Target {
        &self.client_session
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.client_session
    }
}

impl<'a> From<&'a mut Session> for &'a mut ClientSession {
    fn from(session: &'a mut Session) -> &'a mut ClientSession {
        &mut session.client_session
    }
}
