use dioxus::prelude::*;

use quiz_core::session::Mode;

use crate::context::AppContext;
use crate::views::{view_state_from_resource, ViewError, ViewState};
use crate::vm::{start_quiz, QuizIntent, QuizVm};

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let controller = ctx.controller();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<QuizVm>);
    let mut confirm_reset = use_signal(|| false);
    let on_confirm_reset = use_callback(move |wanted: bool| confirm_reset.set(wanted));

    let controller_for_resource = controller.clone();
    let resource = use_resource(move || {
        let controller = controller_for_resource.clone();
        let mut vm = vm;
        let mut error = error;
        async move {
            let started = start_quiz(&controller).await?;
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });

    let state = view_state_from_resource(&resource);

    let dispatch = {
        let controller = controller.clone();
        use_callback(move |intent: QuizIntent| {
            let controller = controller.clone();
            let mut vm = vm;
            let mut error = error;
            spawn(async move {
                let taken = vm.write().take();
                let Some(mut vm_value) = taken else {
                    error.set(Some(ViewError::Unknown));
                    return;
                };

                let result = vm_value.dispatch(&controller, intent).await;

                // Always put the session back so the UI remains usable even
                // after errors.
                *vm.write() = Some(vm_value);

                match result {
                    Ok(()) => error.set(None),
                    Err(err) => error.set(Some(err)),
                }
            });
        })
    };

    let banner = error().map(|err| {
        rsx! {
            p { class: "error-banner", "{err.message()}" }
        }
    });

    rsx! {
        div { class: "page quiz-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(()) => {
                    let current = vm();
                    match current {
                        None => rsx! {
                            p { class: "loading", "Loading..." }
                        },
                        Some(vm_value) if vm_value.is_finished() => rsx! {
                            {banner}
                            ResultsPane { vm: vm_value, dispatch }
                        },
                        Some(vm_value) => rsx! {
                            {banner}
                            QuestionPane {
                                vm: vm_value,
                                dispatch,
                                confirm_reset: confirm_reset(),
                                on_confirm_reset,
                            }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn ResultsPane(vm: QuizVm, dispatch: Callback<QuizIntent>) -> Element {
    rsx! {
        div { class: "results",
            h2 { "Your score is: {vm.score()}/{vm.total()}" }
            div { class: "results-actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !vm.can_leave_results(),
                    onclick: move |_| dispatch.call(QuizIntent::Back),
                    "Back"
                }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| dispatch.call(QuizIntent::Reset),
                    "Reset Quiz"
                }
            }
        }
    }
}

#[component]
fn ModeButton(
    vm_mode: Mode,
    mode: Mode,
    title: &'static str,
    dispatch: Callback<QuizIntent>,
) -> Element {
    let active = if vm_mode == mode { "mode-btn active" } else { "mode-btn" };
    rsx! {
        button {
            class: "{active}",
            r#type: "button",
            onclick: move |_| dispatch.call(QuizIntent::SetMode(mode)),
            "{title}"
        }
    }
}

#[component]
fn QuestionPane(
    vm: QuizVm,
    dispatch: Callback<QuizIntent>,
    confirm_reset: bool,
    on_confirm_reset: Callback<bool>,
) -> Element {
    let rows = vm.option_rows();
    let cells = vm.picker_cells();
    let images = vm.images();
    let reveal = vm.reveal_text();
    let feedback = vm.feedback_text();

    rsx! {
        header { class: "quiz-header",
            span { class: "pill counter", "{vm.counter()}" }
            div { class: "mode-toggles",
                ModeButton {
                    vm_mode: vm.mode(),
                    mode: Mode::ShowAnswer,
                    title: "Show Answer Mode",
                    dispatch,
                }
                ModeButton {
                    vm_mode: vm.mode(),
                    mode: Mode::Normal,
                    title: "Normal Mode",
                    dispatch,
                }
                ModeButton {
                    vm_mode: vm.mode(),
                    mode: Mode::InstantFeedback,
                    title: "Instant Feedback Mode",
                    dispatch,
                }
            }
            div { class: "header-actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: vm.mode() == Mode::ShowAnswer,
                    onclick: move |_| dispatch.call(QuizIntent::FinishNow),
                    "Finish Now"
                }
                button {
                    class: "btn btn-danger",
                    r#type: "button",
                    onclick: move |_| on_confirm_reset.call(true),
                    "Reset Quiz"
                }
            }
        }

        if confirm_reset {
            div { class: "confirm-overlay",
                div { class: "confirm-box",
                    p { "Are you sure you want to reset the quiz?" }
                    div { class: "confirm-actions",
                        button {
                            class: "btn btn-danger",
                            r#type: "button",
                            onclick: move |_| {
                                on_confirm_reset.call(false);
                                dispatch.call(QuizIntent::Reset);
                            },
                            "Reset"
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| on_confirm_reset.call(false),
                            "Cancel"
                        }
                    }
                }
            }
        }

        section { class: "question-card",
            p { class: "prompt", "{vm.prompt()}" }
            for src in images {
                img { class: "question-image", src: "{src}", alt: "question figure" }
            }
            span { class: "pill", "Options" }
            div { class: "options",
                {rows.into_iter().map(|row| {
                    let kind = if row.multi { "checkbox" } else { "radio" };
                    let label = row.label;
                    rsx! {
                        label { class: "option-row", key: "{label}",
                            input {
                                r#type: "{kind}",
                                name: "option",
                                checked: row.selected,
                                disabled: row.disabled,
                                onchange: move |_| dispatch.call(QuizIntent::Select(label)),
                            }
                            "{row.text}"
                        }
                    }
                })}
            }
            if let Some(reveal) = reveal {
                div { class: "reveal-box",
                    span { class: "reveal-title", "Correct Answer: " }
                    "{reveal}"
                }
            }
            if let Some(feedback) = feedback {
                p { class: "feedback", "{feedback}" }
            }
        }

        nav { class: "quiz-nav",
            button {
                class: "btn",
                r#type: "button",
                disabled: vm.at_first(),
                onclick: move |_| dispatch.call(QuizIntent::Retreat),
                "Previous"
            }
            button {
                class: "btn",
                r#type: "button",
                onclick: move |_| dispatch.call(QuizIntent::Advance),
                "Next"
            }
        }

        div { class: "picker",
            {cells.into_iter().map(|cell| {
                let class = if cell.current {
                    "picker-cell current"
                } else if cell.answered {
                    "picker-cell answered"
                } else {
                    "picker-cell"
                };
                let number = cell.index + 1;
                rsx! {
                    button {
                        class: "{class}",
                        key: "{cell.index}",
                        r#type: "button",
                        onclick: move |_| dispatch.call(QuizIntent::JumpTo(cell.index)),
                        "{number}"
                    }
                }
            })}
        }
    }
}
