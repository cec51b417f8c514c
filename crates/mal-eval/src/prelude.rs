/// Definitions written in the language itself, loaded at interpreter startup.
pub const PRELUDE: &str = r#"
(def! not (fn* (a) (if a false true)))

;; (cond test expr test expr ...) expands to nested ifs
(defmacro! cond
  (fn* (& xs)
    (if (> (count xs) 0)
      (list 'if (first xs)
        (if (> (count xs) 1)
          (nth xs 1)
          (throw "odd number of forms to cond"))
        (cons 'cond (rest (rest xs)))))))

;; evaluates every form of a file in the root environment
(def! load-file
  (fn* (f)
    (eval (read-string (str "(do " (slurp f) "\nnil)")))))
"#;
