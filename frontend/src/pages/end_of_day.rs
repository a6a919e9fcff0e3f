use chrono::NaiveDate;
use dioxus::{logger::tracing::info, prelude::*};
use fintra_client::api::system_date::{reset_to_today, system_date, trigger_end_of_day};

use crate::{
  components::toast::{use_notifier, AlertBanner},
  utils::state::AppState,
};

fn format_date(date: Option<NaiveDate>) -> String {
  date.map(|d| d.format("%d.%m.%Y").to_string()).unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn EndOfDay() -> Element {
  let app = use_context::<AppState>();
  let notifier = use_notifier();
  let mut business_date: Signal<Option<NaiveDate>> = use_signal(|| None);
  let mut running = use_signal(|| false);

  use_effect({
    let dispatcher = app.dispatcher.clone();
    move || {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        match system_date(&dispatcher).await {
          Ok(date) => business_date.set(Some(date)),
          Err(e) => notifier.failure(&e, "Could not load the business date"),
        }
      });
    }
  });

  let run_eod = {
    let dispatcher = app.dispatcher.clone();
    move |_: MouseEvent| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        running.set(true);
        match trigger_end_of_day(&dispatcher).await {
          Ok(outcome) => {
            info!("end of day finished: {:?}", outcome);
            if let Some(next) = outcome.date_after_eod.or(outcome.system_date) {
              business_date.set(Some(next));
            }
            notifier.success(outcome.message.unwrap_or_else(|| "End of day completed".to_string()));
          },
          Err(e) => notifier.failure(&e, "End of day failed"),
        }
        running.set(false);
      });
    }
  };

  let reset = {
    let dispatcher = app.dispatcher.clone();
    move |_: MouseEvent| {
      let dispatcher = dispatcher.clone();
      spawn(async move {
        running.set(true);
        match reset_to_today(&dispatcher).await {
          Ok(date) => {
            business_date.set(Some(date));
            notifier.success("Business date reset to today");
          },
          Err(e) => notifier.failure(&e, "Could not reset the business date"),
        }
        running.set(false);
      });
    }
  };

  let date_label = format_date(business_date());

  rsx! {
    h1 { "End of Day" },
    AlertBanner { notifier },
    section {
      class: "card",
      p { class: "home-date", "Current business date: {date_label}" },
      p {
        class: "hint",
        "Running end of day cancels open orders, settles trades and moves the business date forward."
      },
      div {
        class: "form-actions",
        button {
          class: "button button-primary",
          disabled: running(),
          onclick: run_eod,
          if running() { "Running..." } else { "Run end of day" }
        },
        button {
          class: "button",
          disabled: running(),
          onclick: reset,
          "Reset to today"
        }
      }
    }
  }
}
