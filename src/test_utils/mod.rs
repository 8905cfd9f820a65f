#![allow(missing_docs)]

pub(crate) mod backend;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use backend::{
    FakeBackend, RecordedRequest, session_cookie, session_cookie_for_key, spawn_backend,
    test_state, test_user,
};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, element_text, parse_html_document, parse_html_fragment, response_text,
};
pub(crate) use http::{assert_hx_redirect, assert_redirect, get_header};
