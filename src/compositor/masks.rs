//! Glyph templates painted by the compositor.

/// Default skyline mask, used by every station without its own art.
pub const DEFAULT_MASK: &str = r#"                        
 ::::...: :@@@ . @@%+.   .:::: 
 ::.  .   .@%% . #@@@@@%.  .:: 
 :.  #@@:  @%% .     -@@@%  .: 
 . :@@@@@@.%#% .:::.   :@@@: . 
  .@@@..@@@##% .::::::  .@@@.  
  %@@.   :@@%% ......... .@%%  
 .@%#  :.  :@@ ..-:.......=#@. 
 :@%- .:::   : . -@@@@@@@@@@@= 
 .@%#  :::::       :@@#: ...:: 
  %@@. .:::  :@*@-   :@@@+  .. 
  .@@@:.:   %@   +%    *@@@- : 
 . :@@..  :@+  -..@@:   .%@: : 
 :.     :%@%@@ =:.@%@%.     .: 
 ::.. ::@%***@:  :%**%@:: ..:: 
 .. :.%@#****#@= +%***#@%.: .. 
"#;

pub const REKT_MASK: &str = r#"                       
  ████████████████████████ 
     █████████████████████ 
 ███   ████████      █████ 
 █████   ███████     █████ 
 ███████   ████████  █████ 
 █████████    ████████████ 
 ███████████    ██████████ 
 █████████████    ████████ 
 █████  ████████    ████ 
 █████    ████████      
 █████      ████████    ██ 
 █████        ████████████ 
 █████          ██████████ 
 █████            ████████
"#;

pub const REKTORY_MASK: &str = r#"
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⢀⠀⢀⡠⢄⠜⠉⠲⢤⡀⠀⠀⠀⠀⠀⠀⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠠⡏⠓⠋⡀⣀⣠⣄⠀⠀⠙⢦⠀⠀⠀⠀⠀⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⢰⣓⣤⡊⠀⠀⠀⣀⠁⠈⢱⠄⢧⠀⠀⠀⠀⠀
⠀⠀⠀⠀⣀⡀⠀⠀⠀⠀⠀⠀⢠⡏⢠⠀⢠⠀⢠⡌⠀⢰⣧⡀⡾⠀⠀⠀⠀⠀
⠀⠀⢠⠏⠁⢨⠇⠀⠀⠀⠀⠀⢸⠀⠈⢰⡃⠀⠈⠁⠀⠸⣿⣿⠃⠀⠀⠀⠀⠀
⠀⠀⠸⡄⠀⣿⠀⠀⠀⠀⠀⠀⢸⡰⣆⠤⠤⠄⣲⡄⠀⠀⠀⣹⠀⠀⠀⠀⠀⠀
⣰⠒⠒⠓⠤⡈⠳⣄⠀⠀⠀⠀⠀⢳⡀⠉⠍⠉⠀⠀⢀⡴⠋⠁⠀⠀⠀⠀⠀⠀
⡹⠒⠒⠠⢄⡸⠀⢹⠓⠤⢄⣀⠤⠴⠟⠢⣄⣀⠀⣀⠝⠉⡟⠲⢤⡀⠀⠀⠀⠀
⢱⠤⠤⠤⢄⡰⠠⢉⠆⠀⠀⠀⠀⠀⠈⠢⣈⡉⠉⠀⣠⠜⠀⠀⠀⠉⠳⣄⠀⠀
⠸⢄⡒⠤⠤⣃⠜⡜⠀⠀⠀⠀⠀⡀⠀⠀⠀⢸⠀⠀⢃⠀⠀⡄⠀⠀⠀⠈⢣⡀
⠀⠀⠉⠉⠉⠓⠺⠤⠤⠤⠤⠖⡏⠀⠀⠀⠀⠀⡇⠀⠘⠀⠀⢡⠀⡄⠀⠀⠀⢱
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⡇⠀⠀⠀⠀⠀⠀⠀⠀⡇⠀⠨⡜⠀⠀⠀⢀⡎
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠱⢄⡀⠀⠀⠀⢸⠀⠀⢁⡠⠖⡇⣀⠀⢀⠞⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⡆⠀⠈⠉⠐⠒⠃⠀⠀⠀⠀⠀⡇⠀⢱⠋⠀⠀
⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⠀⡗⠦⣀⡀⠀⠀⠀⠀⣀⡠⠔⠋⢱⢐⡏⠀⠀⠀
"#;

pub const EBSM_MASK: &str = r#"
=:.....#=.:.-#:....*-..:-=.
 -:        :--=    + =    =
 -:    *:-:+:.=          .=
 -:       .=  =    *=  -*-.
 -:    *:=.+=:=           =
 -:    * .--:==    + =    =
=:          :#:         :=
 .-+=::#::==-#::::=:.+::::+
.=          .=-:   =+*   -:
-:     .==-+=:=+   :=*   -:
.=:         --=+:   :*   -:
:=+:+=::     =+=#   #=   -:
-:          :+=-=   .=   -:
:-::::%=:::=:+:.:#=-#:...:+
"#;

/// Shown instead of the visualizer while toggled with `z`.
pub const EASTER_EGG: &str = r#"
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓█████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓██████▓▒▒▒▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓██████▓▒▒▒▒▒░   ░▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓██████▓▓▒▒▒▓▓▓▓▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓█████▓▓▒▒▒▒░▒▒▒▒▒▓█▓▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓████▓▒▒▒▒▒▒      ▒█▒ ░▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓██▓▒▒▒▒▒▒██░     ▒█▒ ░▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒████████████▓▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒▒▒▒░         ░▓▒▒▒▒▒▓▓skill issue▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒▒▓▒▒▒░       ░▓▒▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒▒▒▓▓▓▒░░░░  ░▒▒▒▒▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▒▒▒▒▒▒▓▓▓▓▒░░   ▒▓▓▒▒▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▒▒▓▓▓▒▒▒▒▓██▓▒░   ▒█▓▒▒▒▒▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▒▓████▓▒▒▒████▒░░░▓█▓▒▒▒▓██▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓▓▓█████████▒▒██████████▓▒▓██████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓██████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓██████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓▓██████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓▓████████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓███████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓██████████████▓░             ░████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓███████████████████████████▒ ▒██████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████████████████████▒ ▒████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓███████████████████████░ ▒██████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████████████████▓▒▓▓███████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓███████████████████▓▓▓▓█████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████▓▓██████▓▓▒▒▓▓▓▓▓▓▓▓▓▓▓████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████▓▓██████▓▒▒▒▒▒▒▒▒▒▒▒▒▒▓████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████▓▓█████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓█████████▓▓█████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓████████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓████████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
▓▓▓▓▓▓▓▓▓▓████████████████████████████████████▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
"#;
