use dioxus::{logger::tracing::info, prelude::*};
use fintra_client::api::{
  auth::{login, LoginRequest},
  password::{complete_reset, request_reset, verify_code},
};

use crate::{
  components::toast::{use_notifier, AlertBanner},
  utils::state::AppState,
  Route,
};

#[component]
pub fn Login() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut email = use_signal(String::new);
  let mut password = use_signal(String::new);
  let mut loading = use_signal(|| false);
  let nav = navigator();

  let submit = move |evt: FormEvent| {
    evt.prevent_default();
    let app = app.clone();
    let request = LoginRequest::new(email(), password());
    spawn(async move {
      loading.set(true);
      match login(&app.dispatcher, &request).await {
        Ok(session) => {
          info!("signed in as {}", session.display_name());
          if let Ok(route) = app.landing_route().parse::<Route>() {
            nav.push(route);
          }
        },
        Err(e) => notifier.failure(&e, "Invalid email or password"),
      }
      loading.set(false);
    });
  };

  rsx! {
    div {
      class: "auth-page",
      div {
        class: "auth-card",
        h1 { "Fintra Stock Trade" },
        p { class: "auth-subtitle", "Sign in with your corporate account" },
        AlertBanner { notifier },
        form {
          onsubmit: submit,
          div {
            class: "form-group",
            label { class: "form-label", "Email" },
            input {
              class: "form-input",
              r#type: "email",
              autocomplete: "username",
              value: "{email}",
              oninput: move |evt| email.set(evt.value())
            }
          },
          div {
            class: "form-group",
            label { class: "form-label", "Password" },
            input {
              class: "form-input",
              r#type: "password",
              autocomplete: "current-password",
              value: "{password}",
              oninput: move |evt| password.set(evt.value())
            }
          },
          button {
            r#type: "submit",
            class: "button button-primary",
            disabled: loading(),
            if loading() { "Signing in..." } else { "Sign in" }
          }
        },
        Link { class: "auth-link", to: Route::ForgotPassword {}, "Forgot your password?" }
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResetStep {
  Request,
  Verify,
  Complete,
}

#[component]
pub fn ForgotPassword() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut step = use_signal(|| ResetStep::Request);
  let mut email = use_signal(String::new);
  let mut code = use_signal(String::new);
  let mut password = use_signal(String::new);
  let mut confirmation = use_signal(String::new);
  let nav = navigator();

  let submit = move |evt: FormEvent| {
    evt.prevent_default();
    let dispatcher = app.dispatcher.clone();
    spawn(async move {
      match step() {
        ResetStep::Request => match request_reset(&dispatcher, &email()).await {
          Ok(_) => {
            notifier.success("Code sent successfully");
            step.set(ResetStep::Verify);
          },
          Err(e) => notifier.failure(&e, "Invalid email"),
        },
        ResetStep::Verify => match verify_code(&dispatcher, &email(), code().trim()).await {
          Ok(_) => {
            notifier.success("Code verified successfully");
            step.set(ResetStep::Complete);
          },
          Err(e) => notifier.failure(&e, "Invalid code"),
        },
        ResetStep::Complete => match complete_reset(&dispatcher, &email(), code().trim(), &password(), &confirmation()).await {
          Ok(_) => {
            nav.push(Route::Login {});
          },
          Err(e) => notifier.failure(&e, "Failed to change password"),
        },
      }
    });
  };

  rsx! {
    div {
      class: "auth-page",
      div {
        class: "auth-card",
        h1 { "Reset password" },
        AlertBanner { notifier },
        form {
          onsubmit: submit,
          div {
            class: "form-group",
            label { class: "form-label", "Email" },
            input {
              class: "form-input",
              r#type: "email",
              disabled: step() != ResetStep::Request,
              value: "{email}",
              oninput: move |evt| email.set(evt.value())
            }
          },
          if step() != ResetStep::Request {
            div {
              class: "form-group",
              label { class: "form-label", "6-digit code" },
              input {
                class: "form-input",
                inputmode: "numeric",
                maxlength: "6",
                disabled: step() == ResetStep::Complete,
                value: "{code}",
                oninput: move |evt| code.set(evt.value())
              }
            }
          },
          if step() == ResetStep::Complete {
            div {
              class: "form-group",
              label { class: "form-label", "New password" },
              input {
                class: "form-input",
                r#type: "password",
                value: "{password}",
                oninput: move |evt| password.set(evt.value())
              }
            },
            div {
              class: "form-group",
              label { class: "form-label", "Confirm password" },
              input {
                class: "form-input",
                r#type: "password",
                value: "{confirmation}",
                oninput: move |evt| confirmation.set(evt.value())
              }
            }
          },
          button {
            r#type: "submit",
            class: "button button-primary",
            {match step() {
              ResetStep::Request => "Send code",
              ResetStep::Verify => "Verify code",
              ResetStep::Complete => "Change password",
            }}
          }
        },
        Link { class: "auth-link", to: Route::Login {}, "Back to sign in" }
      }
    }
  }
}
