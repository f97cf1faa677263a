#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use puglify::config::EngineSettings;
    use puglify::engine::{LuaEngine, ScriptSource};
    use puglify::error::{EngineError, EngineResult, ErrorKind, Phase, SessionError};
    use puglify::{Request, Session};

    #[derive(Debug, Default)]
    struct Calls {
        data: usize,
        complete: usize,
        errors: Vec<SessionError>,
    }

    type Recorded = Rc<RefCell<Calls>>;

    fn lua_session(source: ScriptSource) -> (Session, Recorded) {
        session_with(|| LuaEngine::sandboxed(None), source)
    }

    fn session_with<F>(factory: F, source: ScriptSource) -> (Session, Recorded)
    where
        F: FnOnce() -> EngineResult<LuaEngine> + Send + 'static,
    {
        let calls: Recorded = Rc::default();
        let (data, complete, error) = (Rc::clone(&calls), Rc::clone(&calls), Rc::clone(&calls));
        let session = Session::with_engine(
            factory,
            source,
            "minify",
            move |_| data.borrow_mut().data += 1,
            move || complete.borrow_mut().complete += 1,
            move |err| error.borrow_mut().errors.push(err),
        );
        (session, calls)
    }

    /// Bootstrap `script` and return the single reported error.
    fn failure(source: ScriptSource) -> SessionError {
        let (session, calls) = lua_session(source);
        assert!(session.bootstrap_failed());

        // Neither start nor send revive a failed session.
        session.start();
        session.send(Request::minify("1", "a", "x = 1;"));
        assert!(!session.is_started());

        let calls = calls.borrow();
        assert_eq!(calls.data, 0);
        assert_eq!(calls.complete, 0);
        assert_eq!(calls.errors.len(), 1, "{:?}", calls.errors);
        calls.errors[0].clone()
    }

    fn inline(script: &str) -> ScriptSource {
        ScriptSource::Inline(script.to_string())
    }

    #[test]
    fn test_bundled_script_bootstraps() {
        let (session, calls) = lua_session(ScriptSource::Bundled);
        assert!(!session.bootstrap_failed());
        assert!(calls.borrow().errors.is_empty());
    }

    #[test]
    fn test_missing_script_file() {
        let err = failure(ScriptSource::File(PathBuf::from(
            "/nonexistent/puglify/minify.lua",
        )));
        assert_eq!(err.kind(), ErrorKind::SourceMissing);
        assert_eq!(err.kind().phase(), Phase::Bootstrap);
    }

    #[test]
    fn test_empty_script() {
        let err = failure(inline(""));
        assert_eq!(err.kind(), ErrorKind::SourceMissing);
    }

    #[test]
    fn test_corrupted_script() {
        let err = failure(inline("function minify(code) return { code = code"));
        assert_eq!(err.kind(), ErrorKind::CompilationFailure);
        assert!(err.detail().unwrap().contains("minify.lua"), "{err}");
        assert!(err
            .to_string()
            .starts_with("The minifier bundle failed to compile. ("));
    }

    #[test]
    fn test_script_raises_while_loading() {
        let err = failure(inline("error('attach failed')"));
        assert_eq!(err.kind(), ErrorKind::RuntimeFailure);
        assert!(err.detail().unwrap().contains("attach failed"));
    }

    #[test]
    fn test_engine_unavailable() {
        let (session, calls) = session_with(
            || Err(EngineError::new("not enough memory")),
            ScriptSource::Bundled,
        );
        assert!(session.bootstrap_failed());
        let calls = calls.borrow();
        assert_eq!(calls.errors.len(), 1);
        assert_eq!(calls.errors[0].kind(), ErrorKind::ContextMissingGlobals);
        insta::assert_snapshot!(
            calls.errors[0].to_string(),
            @"Could not access globals from the context. (not enough memory)"
        );
    }

    #[test]
    fn test_entry_point_not_defined() {
        let err = failure(inline("local helper = 1"));
        assert_eq!(err.kind(), ErrorKind::EntryPointNotFound);
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_entry_point_not_a_function() {
        let err = failure(inline("minify = 'not callable'"));
        assert_eq!(err.kind(), ErrorKind::EntryPointNotCallable);
    }

    #[test]
    fn test_sandbox_blocks_os_access() {
        let err = failure(inline("os.execute('true')\nfunction minify(c) return { code = c } end"));
        assert_eq!(err.kind(), ErrorKind::RuntimeFailure);
    }

    #[test]
    fn test_sandbox_blocks_file_loaders() {
        for loader in ["dofile", "loadfile"] {
            let script = format!(
                "local chunk = {loader}('/etc/hostname')\nfunction minify(c) return {{ code = c }} end"
            );
            let err = failure(inline(&script));
            assert_eq!(err.kind(), ErrorKind::RuntimeFailure, "{loader}");
        }
    }

    #[test]
    fn test_configured_entry_point() {
        let settings = EngineSettings {
            entry_point: "shrink".to_string(),
            ..EngineSettings::default()
        };
        let errors = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&errors);
        let session = Session::with_settings(
            &settings,
            |_| {},
            || {},
            move |err: SessionError| recorded.borrow_mut().push(err.kind()),
        );

        assert!(session.bootstrap_failed());
        assert_eq!(*errors.borrow(), vec![ErrorKind::EntryPointNotFound]);
    }

    #[test]
    fn test_memory_limit_too_small_to_load() {
        let settings = EngineSettings {
            memory_limit: Some(16 * 1024),
            ..EngineSettings::default()
        };
        let errors = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&errors);
        let session = Session::with_settings(
            &settings,
            |_| {},
            || {},
            move |err: SessionError| recorded.borrow_mut().push(err.kind()),
        );

        assert!(session.bootstrap_failed());
        assert_eq!(errors.borrow().len(), 1);
        assert!(errors.borrow()[0].is_terminal());
    }
}
