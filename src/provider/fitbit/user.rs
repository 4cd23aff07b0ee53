//! Fitbit resource owner built from `GET /1/user/-/profile.json`.

// self
use crate::{_prelude::*, error::ResourceOwnerError};

/// The `user` object of a Fitbit profile response.
///
/// Construction fails when `user` is missing or is not an object. Accessors never fail: a
/// missing or non-string field yields `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitbitUser(Map<String, Value>);
impl FitbitUser {
	/// Extracts the `user` object from a decoded profile response.
	pub fn from_response(response: Value) -> Result<Self, ResourceOwnerError> {
		let Value::Object(mut response) = response else {
			return Err(ResourceOwnerError::MissingUser);
		};

		match response.remove("user") {
			Some(Value::Object(user)) => Ok(Self(user)),
			Some(_) => Err(ResourceOwnerError::InvalidUser),
			None => Err(ResourceOwnerError::MissingUser),
		}
	}

	/// Fitbit's encoded user id (`encodedId`).
	pub fn id(&self) -> Option<&str> {
		self.string("encodedId")
	}

	/// `displayName`.
	pub fn display_name(&self) -> Option<&str> {
		self.string("displayName")
	}

	/// `fullName`.
	pub fn full_name(&self) -> Option<&str> {
		self.string("fullName")
	}

	/// `avatar` image URL.
	pub fn avatar(&self) -> Option<&str> {
		self.string("avatar")
	}

	/// IANA time zone name (`timezone`).
	pub fn timezone(&self) -> Option<&str> {
		self.string("timezone")
	}

	/// `locale`, e.g. `en_US`.
	pub fn locale(&self) -> Option<&str> {
		self.string("locale")
	}

	/// `memberSince` date as sent by Fitbit (`YYYY-MM-DD`).
	pub fn member_since(&self) -> Option<&str> {
		self.string("memberSince")
	}

	/// Any field of the user object.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// The user object, verbatim and in response order.
	pub fn to_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Consumes the wrapper and returns the user object.
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	fn string(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}
}
impl TryFrom<Value> for FitbitUser {
	type Error = ResourceOwnerError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		Self::from_response(value)
	}
}
