use std::io::Write;
use std::path::Path;

use exam_core::FormatError;
use exam_core::model::{AnswerKey, ExamDetails, GlobalQuestionId, QuestionStatus, QuestionType};
use services::sessions::PLACEHOLDER_TEST_NAME;
use services::{ExamLoadError, ExamService, SessionStore, placeholder_session};

const DEFINITION: &str = "\u{feff}Section,Question No,Type,Key,Marks,Negative\r\n\
Chemistry,3,NAT,2.5:3.5,4,0\r\n\
Chemistry,1,MCQ,c,4,1\r\n\
\r\n\
Chemistry,2,MSQ,A;D,4,-2\r\n\
Biology,1,MCQ,2,1,0.25\r\n\
Biology,x,MCQ,A,1,0\r\n";

fn write_definition(text: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text).unwrap();
    file.flush().unwrap();
    file
}

fn placeholder_service() -> ExamService {
    ExamService::new(SessionStore::new(placeholder_session()))
}

#[tokio::test]
async fn loading_a_file_installs_a_fresh_session() {
    let file = write_definition(DEFINITION.as_bytes());
    let service = placeholder_service();
    let details = ExamDetails::new("Weekly Test 4", 90 * 60);

    let overview = service
        .load_from_path(file.path(), &details, Some(Path::new("week4.pdf")))
        .await
        .unwrap();
    assert_eq!(overview.test_name, "Weekly Test 4");
    assert_eq!(overview.sections, 2);
    assert_eq!(overview.questions, 4);

    let session = service.store().snapshot();
    let names: Vec<&str> = session.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Chemistry", "Biology"]);

    let ids: Vec<(u32, u32)> = session
        .questions()
        .map(|q| (q.local_number, q.global_id.value()))
        .collect();
    assert_eq!(ids, [(1, 1), (2, 2), (3, 3), (1, 4)]);

    let nat = session.question("Chemistry", 3).unwrap();
    assert_eq!(nat.question_type, QuestionType::NumericRange);
    assert_eq!(nat.status, QuestionStatus::NotVisited);

    let state = session.state();
    assert_eq!(state.total_duration_seconds, 5_400);
    assert_eq!(state.current.as_ref().unwrap().global_id, GlobalQuestionId::FIRST);

    let biology = session.cropper_question("Biology", 1).unwrap();
    assert_eq!(biology.marks.correct(), 1.0);
    assert_eq!(biology.marks.incorrect(), -0.25);

    assert_eq!(session.question_paper(), Some(Path::new("week4.pdf")));

    let definition = session.definition().unwrap();
    let chemistry = definition.section("Chemistry").unwrap();
    let msq = chemistry.questions().iter().find(|q| q.number() == 2).unwrap();
    assert_eq!(msq.key(), &AnswerKey::MultiChoice([0, 3].into_iter().collect()));
    assert_eq!(msq.marks().incorrect(), -2.0);
}

#[tokio::test]
async fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = placeholder_service();

    let err = service
        .load_from_path(&dir.path().join("absent.csv"), &ExamDetails::new("x", 60), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLoadError::Read(_)));
    assert_eq!(service.store().read(|s| s.state().test_name.clone()), PLACEHOLDER_TEST_NAME);
}

#[tokio::test]
async fn non_utf8_file_is_a_read_error() {
    let file = write_definition(&[0xff, 0xfe, b'S', b'\n', 0xc3]);
    let service = placeholder_service();

    let err = service
        .load_from_path(file.path(), &ExamDetails::new("x", 60), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLoadError::Read(_)));
}

#[tokio::test]
async fn bad_header_keeps_the_previous_session() {
    let file = write_definition(b"Section,Question No,Type,Key,Marks\nA,1,MCQ,A,4\n");
    let service = placeholder_service();
    let before = service.store().snapshot();

    let err = service
        .load_from_path(file.path(), &ExamDetails::new("x", 60), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExamLoadError::Format(FormatError::MissingColumn("negative"))));
    assert_eq!(err.to_string(), "invalid exam definition: missing column `negative`");
    assert_eq!(service.store().snapshot(), before);
}

#[tokio::test]
async fn later_loads_replace_earlier_ones() {
    let service = placeholder_service();
    service
        .load_from_reader(DEFINITION.as_bytes(), &ExamDetails::new("First", 60), None)
        .await
        .unwrap();
    service
        .load_from_reader(
            "Section,Question No,Type,Key,Marks,Negative\nOnly,5,MCQ,A,1,0\n".as_bytes(),
            &ExamDetails::new("Second", 120),
            None,
        )
        .await
        .unwrap();

    service.store().read(|session| {
        assert_eq!(session.state().test_name, "Second");
        assert!(session.section("Chemistry").is_none());
        assert!(session.cropper_section("Chemistry").is_none());
        assert_eq!(session.question("Only", 5).unwrap().global_id, GlobalQuestionId::FIRST);
    });
}

#[tokio::test]
async fn session_serializes_for_the_frontend() {
    let service = placeholder_service();
    service
        .load_from_reader(DEFINITION.as_bytes(), &ExamDetails::new("Json", 60), None)
        .await
        .unwrap();

    let value = serde_json::to_value(service.store().snapshot()).unwrap();
    assert_eq!(value["state"]["test_name"], "Json");
    assert_eq!(value["state"]["test_status"], "notStarted");
    assert_eq!(value["state"]["numbering_order"], "original");
    assert_eq!(value["state"]["save_test_data"], true);
    assert_eq!(value["questions"]["Biology"]["1"]["status"], "notVisited");
}
