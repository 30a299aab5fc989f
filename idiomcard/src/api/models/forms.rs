//! Typed form payloads of the workflow stages.
//!
//! The stage forms submit repeated keys (`selected_texts=a&selected_texts=b`). They are parsed
//! in order into [`FormFields`] and then validated into one DTO per stage, so handlers never see
//! an untyped form.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};

use crate::errors::Error;

/// Raw `application/x-www-form-urlencoded` pairs in submission order
#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(body).into_owned().collect())
    }

    /// All values submitted under `name`, in order, duplicates kept
    pub fn values(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Reject keys outside `allowed`
    fn only(self, allowed: &[&str]) -> Result<Self, Error> {
        if let Some((key, _)) = self.0.iter().find(|(key, _)| !allowed.contains(&key.as_str())) {
            return Err(Error::BadRequest {
                message: format!("Unexpected form field '{key}'"),
            });
        }
        Ok(self)
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"));
        if !is_form {
            return Err(Error::BadRequest {
                message: "Expected an application/x-www-form-urlencoded body".to_string(),
            });
        }

        let body = Bytes::from_request(req, state).await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read form body: {e}"),
        })?;
        Ok(Self::parse(&body))
    }
}

/// Texts picked on the scan page, or carried forward from the selection page.
///
/// Order and duplicates are kept exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionForm {
    pub selected_texts: Vec<String>,
}

impl TryFrom<FormFields> for SelectionForm {
    type Error = Error;

    fn try_from(fields: FormFields) -> Result<Self, Self::Error> {
        let fields = fields.only(&["selected_texts"])?;
        Ok(Self {
            selected_texts: fields.values("selected_texts"),
        })
    }
}

impl<S> FromRequest<S> for SelectionForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        FormFields::from_request(req, state).await?.try_into()
    }
}

/// Texts and explanations submitted from the results page.
///
/// The two lists are independent: nothing ties the n-th explanation to the n-th text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateLinkForm {
    pub selected_texts: Vec<String>,
    pub explanations: Vec<String>,
}

impl TryFrom<FormFields> for GenerateLinkForm {
    type Error = Error;

    fn try_from(fields: FormFields) -> Result<Self, Self::Error> {
        let fields = fields.only(&["selected_texts", "explanations"])?;
        Ok(Self {
            selected_texts: fields.values("selected_texts"),
            explanations: fields.values("explanations"),
        })
    }
}

impl<S> FromRequest<S> for GenerateLinkForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        FormFields::from_request(req, state).await?.try_into()
    }
}
