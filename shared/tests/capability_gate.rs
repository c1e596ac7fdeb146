mod common;

use chat_shared::capabilities::{
    CameraError, CameraOperation, CameraOutput, CapabilityKind, DialogChoice, DialogOperation,
    ImageHandle, LinkingError, LinkingOperation, LocationError, LocationFix, LocationOperation,
    PermissionState, PermissionsOperation, PermissionsOutput,
};
use chat_shared::{AppConfig, EntryKind, EntryPayload, ErrorKind, Event, NoticeAction};
use common::Shell;

fn logged_in() -> Shell {
    let mut shell = Shell::default();
    shell.login("vikas", "12345");
    shell
}

fn logged_in_without_rationale() -> Shell {
    let mut shell = logged_in();
    shell.send(Event::Configure(Box::new(
        AppConfig::default().with_explain_before_request(false),
    )));
    shell
}

fn proceed_through_rationale(shell: &mut Shell, kind: CapabilityKind) {
    let request = shell.dialog().expect("rationale dialog");
    let DialogOperation::Confirm(prompt) = &request.operation;
    assert_eq!(prompt.capability, kind);
    assert_eq!(prompt.title, "Permission Required");
    shell.resolve(request, DialogChoice::Proceed);
}

fn answer_permission(shell: &mut Shell, expected: PermissionsOperation, state: PermissionState) {
    let request = shell.permissions().expect("permission request");
    assert_eq!(request.operation, expected);
    shell.resolve(request, PermissionsOutput::State(state));
}

#[test]
fn granted_location_appends_entry_and_opens_maps() {
    let mut shell = logged_in();

    shell.send(Event::ShareLocationRequested);
    proceed_through_rationale(&mut shell, CapabilityKind::Location);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Granted,
    );

    let request = shell.location().expect("location fix request");
    let LocationOperation::GetCurrentFix(options) = &request.operation;
    assert!(options.high_accuracy);
    assert_eq!(options.timeout_ms, 15_000);
    assert!(shell.chat_view().is_locating);

    shell.resolve(
        request,
        Ok(LocationFix {
            latitude: 37.7749,
            longitude: -122.4194,
            accuracy_m: Some(5.0),
        }),
    );

    let chat = shell.chat_view();
    assert!(!chat.is_locating);
    assert!(!chat.location_busy);
    assert_eq!(chat.entries.len(), 2);
    let entry = &chat.entries[1];
    assert_eq!(entry.kind, EntryKind::Location);
    assert!(entry.can_open_in_maps);
    assert_eq!(chat.scroll_anchor, Some(entry.id));
    assert!(shell.model.notices.is_empty());

    shell.send(Event::OpenInMapsRequested { entry_id: entry.id });
    let request = shell.linking().expect("open url request");
    assert_eq!(
        request.operation,
        LinkingOperation::OpenUrl {
            url: "https://www.google.com/maps/search/?api=1&query=37.7749,-122.4194".into()
        }
    );
    shell.resolve(request, Ok(()));
    assert!(shell.model.notices.is_empty());
}

#[test]
fn map_that_cannot_open_produces_notice() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Granted,
    );
    let request = shell.location().expect("location fix request");
    shell.resolve(
        request,
        Ok(LocationFix {
            latitude: 1.5,
            longitude: 2.5,
            accuracy_m: None,
        }),
    );

    let entry_id = shell.chat_view().entries[1].id;
    shell.send(Event::OpenInMapsRequested { entry_id });
    let request = shell.linking().expect("open url request");
    shell.resolve(
        request,
        Err(LinkingError::NoHandler {
            url: "https://www.google.com/maps/search/?api=1&query=1.5,2.5".into(),
        }),
    );

    let notice = shell.view().notice.expect("linking notice");
    assert_eq!(notice.title, "Error");
    assert_eq!(notice.message, "Cannot open Google Maps.");
    assert_eq!(shell.log_len(), 2);
}

#[test]
fn camera_denied_after_request_reports_permission_denied() {
    let mut shell = logged_in();

    shell.send(Event::CapturePhotoRequested);
    proceed_through_rationale(&mut shell, CapabilityKind::Camera);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::Denied,
    );
    answer_permission(
        &mut shell,
        PermissionsOperation::Request(CapabilityKind::Camera),
        PermissionState::Denied,
    );

    assert!(shell.camera().is_none());
    assert_eq!(shell.log_len(), 1);
    let notice = shell.model.active_notice().expect("denied notice");
    assert_eq!(notice.kind, ErrorKind::PermissionDenied);
    assert_eq!(notice.action(), None);
    assert!(shell.view().notice.expect("denied notice").is_retryable);
    assert!(!shell.chat_view().camera_busy);
}

#[test]
fn undetermined_then_granted_captures_photo() {
    let mut shell = logged_in();

    shell.send(Event::CapturePhotoRequested);
    proceed_through_rationale(&mut shell, CapabilityKind::Camera);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::Undetermined,
    );
    assert!(shell.camera().is_none());
    answer_permission(
        &mut shell,
        PermissionsOperation::Request(CapabilityKind::Camera),
        PermissionState::Granted,
    );

    let request = shell.camera().expect("capture request");
    shell.resolve(
        request,
        Ok(CameraOutput::Photo(ImageHandle::new("file:///first.jpg"))),
    );

    let chat = shell.chat_view();
    assert_eq!(chat.entries.len(), 2);
    assert_eq!(chat.entries[1].kind, EntryKind::Image);
    assert_eq!(chat.entries[1].image_uri.as_deref(), Some("file:///first.jpg"));
    assert!(!chat.camera_busy);
    assert!(shell.model.notices.is_empty());
    assert!(!shell.has_pending());
}

#[test]
fn blocked_permission_never_invokes_and_offers_settings() {
    let mut shell = logged_in();

    shell.send(Event::CapturePhotoRequested);
    proceed_through_rationale(&mut shell, CapabilityKind::Camera);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::PermanentlyBlocked,
    );

    assert!(shell.permissions().is_none());
    assert!(shell.camera().is_none());
    assert_eq!(shell.log_len(), 1);

    let notice = shell.view().notice.expect("blocked notice");
    assert_eq!(notice.title, "Permission Blocked");
    assert_eq!(notice.action, Some(NoticeAction::OpenSettings));

    shell.send(Event::NoticeActionSelected);
    let request = shell.permissions().expect("open settings request");
    assert_eq!(request.operation, PermissionsOperation::OpenSettings);
    shell.resolve(request, PermissionsOutput::SettingsOpened(true));
    assert!(shell.view().notice.is_none());
}

#[test]
fn blocked_after_request_is_reported_as_blocked() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Undetermined,
    );
    answer_permission(
        &mut shell,
        PermissionsOperation::Request(CapabilityKind::Location),
        PermissionState::PermanentlyBlocked,
    );

    assert!(shell.location().is_none());
    let notice = shell.model.active_notice().expect("blocked notice");
    assert_eq!(notice.kind, ErrorKind::PermissionBlocked);
}

#[test]
fn declined_rationale_skips_permission_prompt() {
    let mut shell = logged_in();

    shell.send(Event::ShareLocationRequested);
    let request = shell.dialog().expect("rationale dialog");
    shell.resolve(request, DialogChoice::Cancel);

    assert!(shell.permissions().is_none());
    assert!(shell.location().is_none());
    assert!(!shell.has_pending());
    assert_eq!(shell.log_len(), 1);
    let notice = shell.model.active_notice().expect("cancel notice");
    assert_eq!(notice.kind, ErrorKind::Cancelled);
    assert!(!shell.chat_view().location_busy);
}

#[test]
fn unavailable_capability_is_a_capability_error() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Unavailable,
    );

    assert!(shell.permissions().is_none());
    assert!(shell.location().is_none());
    let notice = shell.model.active_notice().expect("unavailable notice");
    assert_eq!(notice.kind, ErrorKind::CapabilityUnavailable);
}

#[test]
fn location_timeout_surfaces_as_timeout_notice() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Granted,
    );
    let request = shell.location().expect("location fix request");
    shell.resolve(request, Err(LocationError::Timeout));

    let notice = shell.model.active_notice().expect("timeout notice");
    assert_eq!(notice.kind, ErrorKind::Timeout);
    assert_eq!(notice.capability, Some(CapabilityKind::Location));
    assert_eq!(shell.log_len(), 1);
}

#[test]
fn dismissed_camera_is_a_cancellation_not_an_error() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::CapturePhotoRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::Granted,
    );
    let request = shell.camera().expect("capture request");
    let CameraOperation::CaptureStill { config } = &request.operation;
    assert!(config.save_to_library);
    shell.resolve(request, Ok(CameraOutput::Cancelled));

    assert_eq!(shell.log_len(), 1);
    let notice = shell.model.active_notice().expect("cancel notice");
    assert_eq!(notice.kind, ErrorKind::Cancelled);
}

#[test]
fn camera_failure_message_reaches_the_notice() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::CapturePhotoRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::Granted,
    );
    let request = shell.camera().expect("capture request");
    shell.resolve(
        request,
        Err(CameraError::CaptureFailed {
            reason: "sensor busy".into(),
        }),
    );

    let notice = shell.view().notice.expect("failure notice");
    assert_eq!(notice.message, "capture failed: sensor busy");
}

#[test]
fn successes_append_in_completion_order() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    shell.send(Event::CapturePhotoRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Granted,
    );
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Camera),
        PermissionState::Granted,
    );

    let location = shell.location().expect("location fix request");
    let camera = shell.camera().expect("capture request");
    let chat = shell.chat_view();
    assert!(chat.location_busy && chat.camera_busy);

    shell.resolve(
        camera,
        Ok(CameraOutput::Photo(
            ImageHandle::new("file:///photo.jpg").with_dimensions(640, 480),
        )),
    );
    shell.resolve(
        location,
        Ok(LocationFix {
            latitude: 10.0,
            longitude: 20.0,
            accuracy_m: None,
        }),
    );

    let entries = shell.model.session().expect("session").log.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].kind(), EntryKind::Image);
    assert_eq!(entries[2].kind(), EntryKind::Location);
    assert!(entries[1].id() < entries[2].id());
    assert!(matches!(
        entries[1].payload(),
        EntryPayload::Image(handle) if handle.uri == "file:///photo.jpg"
    ));
    assert!(shell.model.notices.is_empty());
}

#[test]
fn repeated_request_while_in_flight_is_ignored() {
    let mut shell = logged_in();

    shell.send(Event::ShareLocationRequested);
    shell.send(Event::ShareLocationRequested);

    assert!(shell.dialog().is_some());
    assert!(shell.dialog().is_none());
    assert!(shell.chat_view().location_busy);
}

#[test]
fn outcome_after_logout_is_discarded() {
    let mut shell = logged_in_without_rationale();

    shell.send(Event::ShareLocationRequested);
    answer_permission(
        &mut shell,
        PermissionsOperation::Check(CapabilityKind::Location),
        PermissionState::Granted,
    );
    let request = shell.location().expect("location fix request");

    shell.send(Event::LogoutRequested);
    shell.resolve(
        request,
        Ok(LocationFix {
            latitude: 37.7749,
            longitude: -122.4194,
            accuracy_m: None,
        }),
    );
    assert!(shell.model.session().is_none());

    shell.login("vikas", "12345");
    assert_eq!(shell.log_len(), 1);
    assert!(shell.model.notices.is_empty());
    assert!(!shell.chat_view().location_busy);
}
