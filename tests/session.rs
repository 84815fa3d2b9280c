use ash::Interpreter;
use ash::command::Streams;
use ash::env::Environment;
use ash::io_adapters::StreamReader;
use std::fs;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};

static CWD: Mutex<()> = Mutex::new(());

fn lock_current_dir() -> MutexGuard<'static, ()> {
    CWD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Session {
    prompts: String,
    stdout: String,
    stderr: String,
    sh: Interpreter,
}

fn run_session(home: &str, input: &str) -> Session {
    let env = Environment::with_identity("u", "box", Some(home), Some("/bin:/usr/bin"));
    let mut sh = Interpreter::with_environment(env);
    let mut reader = StreamReader::new(Cursor::new(input.to_string()), Vec::new());
    let mut out = Vec::new();
    let mut err = Vec::new();
    sh.repl(&mut reader, Streams::new(&mut out, &mut err))
        .expect("session failed");
    Session {
        prompts: String::from_utf8(reader.into_inner().1).unwrap(),
        stdout: String::from_utf8(out).unwrap(),
        stderr: String::from_utf8(err).unwrap(),
        sh,
    }
}

#[test]
fn whitespace_lines_only_prompt() {
    let _lock = lock_current_dir();
    let s = run_session("/home/u", "\n   \n\t\n");
    assert!(s.stdout.is_empty());
    assert!(s.stderr.is_empty());
    assert_eq!(s.prompts.matches("|$ ").count(), 4);
    assert!(s.prompts.starts_with("u::box "));
}

#[test]
fn mixed_session() {
    let _lock = lock_current_dir();
    let input = "echo \"a b\" c\n\
                 $HOME\n\
                 $UNSET\n\
                 builtin sleep\n\
                 builtin frobnicate\n\
                 sleep abc\n\
                 sleep 0\n\
                 echo x\n\
                 echo x\n";
    let s = run_session("/home/u", input);
    assert_eq!(
        s.stdout,
        "a b c\n\
         /home/u\n\
         ash: command: sleep [sec] :: sleep for [sec] seconds\n\
         ash frobnicate: error: unrecognized command \n\
         ash sleep: error: incorrect value type \n\
         x\n\
         x\n"
    );
    assert!(s.stderr.is_empty());
}

#[test]
fn external_commands_share_the_terminal() {
    let _lock = lock_current_dir();
    let s = run_session("/home/u", "true\nsh -c \"kill -KILL $$\"\nno_such_ash_cmd\n");
    assert_eq!(
        s.stdout,
        "ash sh: error: abnormal termination \n\
         ash: error: no_such_ash_cmd: No such file or directory\n"
    );
    assert_eq!(s.stderr, "sh: exit status: 9\n");
}

#[test]
fn cd_updates_prompt_and_pwd() {
    let _lock = lock_current_dir();
    let orig = std::env::current_dir().unwrap();
    let base = std::env::temp_dir().join(format!("ash_session_cd_{}", std::process::id()));
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("work")).unwrap();
    let home = fs::canonicalize(&base).unwrap();
    let home_str = home.to_string_lossy().to_string();

    let input = "cd ~\n\
                 $PWD\n\
                 cd work\n\
                 cd does_not_exist\n\
                 $PWD\n\
                 exit\n\
                 echo unreachable\n";
    let s = run_session(&home_str, input);
    std::env::set_current_dir(&orig).unwrap();
    let _ = fs::remove_dir_all(&base);

    let work = home.join("work").to_string_lossy().to_string();
    assert_eq!(
        s.stdout,
        format!(
            "{home_str}\n\
             ash cd: error: No such file or directory \n\
             {work}\n"
        )
    );
    assert!(s.prompts.contains("u::box ~|$ "));
    assert!(s.prompts.ends_with("u::box work|$ "));
    assert!(s.sh.env().should_exit);
    assert_eq!(s.sh.env().display_dir, "work");
}
